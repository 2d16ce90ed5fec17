//! Foundation utilities and types

pub mod color;
pub mod logging;
pub mod math;

pub use color::RgbaColor;
