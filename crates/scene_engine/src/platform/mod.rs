//! Platform abstraction
//!
//! Display and input devices are provided by the host platform. The engine
//! only needs to know whether they are open, how big the display is, and how
//! to pull events.

pub mod event;
pub mod headless;

pub use event::{Event, EventType};

/// Open / closed state shared by displays and input devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceState {
    /// Usable
    #[default]
    Open,
    /// Closed, no longer produces frames or events
    Closed,
}

/// Raw platform handles for binding a graphics API to a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeHandles {
    /// Platform display / connection handle
    pub display: usize,
    /// Platform window handle
    pub window: usize,
}

/// Output surface
///
/// Shared between the drawing context, the input device and the main loop,
/// so state changes go through `&self`.
pub trait DisplayDevice {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Current state
    fn state(&self) -> DeviceState;

    /// Close the display
    fn close(&self);

    /// Native handles for graphics API binding
    fn native_handles(&self) -> NativeHandles;

    /// Width over height
    fn aspect_ratio(&self) -> f32 {
        if self.height() == 0 {
            1.0
        } else {
            self.width() as f32 / self.height() as f32
        }
    }
}

/// Source of input events
pub trait InputDevice {
    /// Current state
    fn state(&self) -> DeviceState;

    /// Stop producing events
    fn close(&mut self);

    /// Fetch new events from the platform. Called once per dispatch pass.
    fn poll(&mut self) {}

    /// Events ready to be read
    fn pending(&self) -> usize;

    /// Next ready event
    fn next_event(&mut self) -> Option<Event>;
}
