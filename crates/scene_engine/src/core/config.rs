//! # Engine Configuration
//!
//! Settings for the display, renderer, default camera and the first-person
//! controller. Every field has a default so partial files load cleanly.
//!
//! ```toml
//! [display]
//! width = 1280
//! height = 720
//!
//! [camera]
//! zfar = 0.0   # infinite far plane
//! ```

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;

use crate::foundation::color::RgbaColor;

pub use crate::config::{Config, ConfigError, ConfigFormat};

/// Window / surface settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Window title
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            title: "Scene Engine".to_string(),
        }
    }
}

/// Renderer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Clear colour as `[r, g, b, a]`
    pub background_color: [f32; 4],
}

impl RendererConfig {
    /// Clear colour
    pub fn background(&self) -> RgbaColor {
        RgbaColor::from(self.background_color)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            background_color: RgbaColor::WHITE.to_array(),
        }
    }
}

/// Default perspective camera parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in radians
    pub yfov: f32,
    /// Near plane distance
    pub znear: f32,
    /// Far plane distance; zero or negative selects an infinite far plane
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            yfov: FRAC_PI_4,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

/// First-person controller tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Distance moved per processed frame while a movement key is held
    pub move_step: f32,
    /// Pointer pixels per half turn of yaw
    pub yaw_divisor: f32,
    /// Pointer pixels per half turn of pitch
    pub pitch_divisor: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            move_step: 0.05,
            yaw_divisor: 1000.0,
            pitch_divisor: 400.0,
        }
    }
}

/// # Engine Configuration
///
/// Top-level settings, loadable from `.toml` or `.ron` through [`Config`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Display settings
    pub display: DisplayConfig,
    /// Renderer settings
    pub renderer: RendererConfig,
    /// Default camera settings
    pub camera: CameraConfig,
    /// Controller settings
    pub controller: ControllerConfig,
}

impl EngineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display size
    pub fn with_display_size(mut self, width: u32, height: u32) -> Self {
        self.display.width = width;
        self.display.height = height;
        self
    }

    /// Set clear colour
    pub fn with_background(mut self, color: RgbaColor) -> Self {
        self.renderer.background_color = color.to_array();
        self
    }
}

impl Config for EngineConfig {}
