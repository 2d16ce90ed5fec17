//! Concrete drawing-context backends

pub mod headless;

pub use headless::{DeviceCommand, HeadlessContext, RecordingDevice};
