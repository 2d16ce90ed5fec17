//! Headless platform devices
//!
//! [`HeadlessDisplay`] has no window, only an open/closed state and an
//! optional frame budget. [`ScriptedInput`] replays queued events one batch per
//! poll.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::core::config::DisplayConfig;
use crate::platform::{DeviceState, DisplayDevice, Event, InputDevice, NativeHandles};

/// Window-less display
#[derive(Debug)]
pub struct HeadlessDisplay {
    width: u32,
    height: u32,
    state: Cell<DeviceState>,
    frames_left: Cell<Option<u64>>,
}

impl HeadlessDisplay {
    /// Open a display of the given size
    pub fn new(width: u32, height: u32) -> Self {
        log::debug!("Headless display opened ({}x{})", width, height);
        Self {
            width,
            height,
            state: Cell::new(DeviceState::Open),
            frames_left: Cell::new(None),
        }
    }

    /// Open a display sized from configuration
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(config.width, config.height)
    }

    /// Close automatically after `frames` presented frames
    #[must_use]
    pub fn with_frame_budget(self, frames: u64) -> Self {
        self.frames_left.set(Some(frames));
        self
    }

    /// Count one presented frame against the budget
    pub fn frame_presented(&self) {
        if let Some(left) = self.frames_left.get() {
            let left = left.saturating_sub(1);
            self.frames_left.set(Some(left));
            if left == 0 {
                log::info!("Frame budget exhausted, closing display");
                self.close();
            }
        }
    }
}

impl DisplayDevice for HeadlessDisplay {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn state(&self) -> DeviceState {
        self.state.get()
    }

    fn close(&self) {
        if self.state.replace(DeviceState::Closed) == DeviceState::Open {
            log::debug!("Headless display closed");
        }
    }

    fn native_handles(&self) -> NativeHandles {
        NativeHandles::default()
    }
}

/// Input device that replays pre-recorded batches of events
///
/// Each [`InputDevice::poll`] makes the next batch pending. Yielding
/// [`Event::Close`] closes both the input device and the display.
pub struct ScriptedInput {
    display: Rc<dyn DisplayDevice>,
    state: DeviceState,
    batches: VecDeque<Vec<Event>>,
    ready: VecDeque<Event>,
}

impl ScriptedInput {
    /// Create an input device bound to `display`
    pub fn new(display: Rc<dyn DisplayDevice>) -> Self {
        Self {
            display,
            state: DeviceState::Open,
            batches: VecDeque::new(),
            ready: VecDeque::new(),
        }
    }

    /// Queue a batch to be delivered by a future poll
    pub fn push_batch(&mut self, events: impl IntoIterator<Item = Event>) {
        self.batches.push_back(events.into_iter().collect());
    }

    /// Builder form of [`ScriptedInput::push_batch`]
    #[must_use]
    pub fn with_batch(mut self, events: impl IntoIterator<Item = Event>) -> Self {
        self.push_batch(events);
        self
    }

    /// Batches not yet polled
    pub fn queued_batches(&self) -> usize {
        self.batches.len()
    }
}

impl InputDevice for ScriptedInput {
    fn state(&self) -> DeviceState {
        self.state
    }

    fn close(&mut self) {
        self.state = DeviceState::Closed;
        self.ready.clear();
        self.display.close();
    }

    fn poll(&mut self) {
        if self.ready.is_empty() {
            if let Some(batch) = self.batches.pop_front() {
                self.ready.extend(batch);
            }
        }
    }

    fn pending(&self) -> usize {
        self.ready.len()
    }

    fn next_event(&mut self) -> Option<Event> {
        let event = self.ready.pop_front()?;
        if event == Event::Close {
            log::info!("Close requested");
            self.close();
        }
        Some(event)
    }
}
