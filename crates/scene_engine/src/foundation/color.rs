//! RGBA colour value

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Vec3, Vec4};

/// Linear RGBA colour with `f32` channels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RgbaColor {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl RgbaColor {
    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Build from channels
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from RGB
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Build from `f64` channels
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_f64(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self::new(r as f32, g as f32, b as f32, a as f32)
    }

    /// Build from 8-bit channels, mapping 0..=255 onto 0.0..=1.0
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let unit = |c: u8| f32::from(c) / 255.0;
        Self::new(unit(r), unit(g), unit(b), unit(a))
    }

    /// RGB channels
    pub const fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    /// RGBA channels
    pub const fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }

    /// Channels as `[r, g, b, a]`
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[f32; 4]> for RgbaColor {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

impl From<RgbaColor> for [f32; 4] {
    fn from(c: RgbaColor) -> Self {
        c.to_array()
    }
}
