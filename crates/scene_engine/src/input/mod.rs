//! Input handling
//!
//! Key and pointer identifiers carried by platform events, and controllers
//! that turn those events into scene changes.

pub mod camera_controller;

pub use camera_controller::FpsCameraController;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// 0 key
    Key0,
    /// 1 key
    Key1,
    /// 2 key
    Key2,
    /// 3 key
    Key3,
    /// 4 key
    Key4,
    /// 5 key
    Key5,
    /// 6 key
    Key6,
    /// 7 key
    Key7,
    /// 8 key
    Key8,
    /// 9 key
    Key9,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Pointer / touch buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchButton {
    /// Left button or primary touch
    Left,
    /// Middle button
    Middle,
    /// Right button
    Right,
    /// Wheel scrolled up
    ScrollUp,
    /// Wheel scrolled down
    ScrollDown,
}
