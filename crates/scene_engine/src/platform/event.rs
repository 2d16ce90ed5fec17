//! Platform events

use crate::input::{KeyCode, TouchButton};

bitflags::bitflags! {
    /// Event categories, usable as a handler filter
    ///
    /// A handler receives an event when its filter shares at least one bit
    /// with the event's type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventType: u32 {
        /// Window close request
        const CLOSE = 0x1;
        /// Every system event
        const ALL_SYSTEM = 0xF;
        /// Key pressed
        const KEY_PRESS = 0x10;
        /// Key released
        const KEY_RELEASE = 0x20;
        /// Every key event
        const ALL_KEY = 0xF0;
        /// Pointer / touch pressed
        const TOUCH_PRESS = 0x100;
        /// Pointer / touch released
        const TOUCH_RELEASE = 0x200;
        /// Pointer / touch moved
        const TOUCH_MOVE = 0x400;
        /// Every pointer / touch event
        const ALL_TOUCH = 0xF00;
        /// First application-defined slot
        const CUSTOM = 0x1000;
        /// Every application-defined event
        const ALL_CUSTOM = 0xF000;
        /// Everything
        const ALL = 0xFFFF;
    }
}

impl EventType {
    /// Number of application-defined slots
    pub const CUSTOM_SLOTS: u8 = 14;

    /// Type of the application-defined event in `slot` (clamped to the last slot)
    pub fn custom(slot: u8) -> Self {
        let slot = u32::from(slot.min(Self::CUSTOM_SLOTS - 1));
        Self::from_bits_retain((slot + 1) << 12)
    }
}

/// Input or system event produced by an [`InputDevice`](crate::platform::InputDevice)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The window was asked to close
    Close,
    /// Key went down
    KeyPress(KeyCode),
    /// Key went up
    KeyRelease(KeyCode),
    /// Pointer button or touch went down
    TouchPress {
        /// Button
        button: TouchButton,
        /// X in window pixels
        x: i32,
        /// Y in window pixels
        y: i32,
    },
    /// Pointer button or touch went up
    TouchRelease {
        /// Button
        button: TouchButton,
        /// X in window pixels
        x: i32,
        /// Y in window pixels
        y: i32,
    },
    /// Pointer moved
    TouchMove {
        /// Button held, if any
        button: Option<TouchButton>,
        /// X in window pixels
        x: i32,
        /// Y in window pixels
        y: i32,
    },
    /// Application-defined event in one of [`EventType::CUSTOM_SLOTS`] slots
    Custom(u8),
}

impl Event {
    /// Category of this event
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Close => EventType::CLOSE,
            Self::KeyPress(_) => EventType::KEY_PRESS,
            Self::KeyRelease(_) => EventType::KEY_RELEASE,
            Self::TouchPress { .. } => EventType::TOUCH_PRESS,
            Self::TouchRelease { .. } => EventType::TOUCH_RELEASE,
            Self::TouchMove { .. } => EventType::TOUCH_MOVE,
            Self::Custom(slot) => EventType::custom(*slot),
        }
    }

    /// Whether a handler with `filter` should see this event
    pub fn matches(&self, filter: EventType) -> bool {
        self.event_type().intersects(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_masks_cover_members() {
        assert!(Event::Close.matches(EventType::ALL_SYSTEM));
        assert!(Event::KeyPress(KeyCode::W).matches(EventType::ALL_KEY));
        assert!(Event::KeyRelease(KeyCode::W).matches(EventType::ALL_KEY));
        let moved = Event::TouchMove { button: None, x: 1, y: 2 };
        assert!(moved.matches(EventType::ALL_TOUCH));
        assert!(Event::Custom(0).matches(EventType::ALL_CUSTOM));
        assert!(Event::Custom(13).matches(EventType::ALL));
    }

    #[test]
    fn test_touch_bits_do_not_overlap() {
        let moved = Event::TouchMove { button: None, x: 0, y: 0 };
        let pressed = Event::TouchPress { button: TouchButton::Left, x: 0, y: 0 };
        assert!(!moved.matches(EventType::TOUCH_PRESS));
        assert!(!moved.matches(EventType::TOUCH_RELEASE));
        assert!(!pressed.matches(EventType::TOUCH_MOVE));
    }

    #[test]
    fn test_unrelated_filters() {
        assert!(!Event::Close.matches(EventType::ALL_KEY));
        assert!(!Event::KeyPress(KeyCode::A).matches(EventType::KEY_RELEASE));
        assert!(!Event::KeyPress(KeyCode::A).matches(EventType::empty()));
    }

    #[test]
    fn test_custom_slots() {
        assert_eq!(EventType::custom(0), EventType::CUSTOM);
        assert_eq!(EventType::custom(13).bits(), 0xE000);
        assert_eq!(EventType::custom(200).bits(), 0xE000);
    }
}
