//! # Core Engine Module
//!
//! Shared configuration used by the scene, render and input layers.

pub mod config;

pub use config::{
    CameraConfig, Config, ConfigError, ControllerConfig, DisplayConfig, EngineConfig,
    RendererConfig,
};
