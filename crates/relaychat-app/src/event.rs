//! Application input events.
//!
//! [`AppEvent`] covers what the user and the host window do. Transport
//! deliveries never reach the [`crate::App`]; the runtime routes them to the
//! session directly.

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Host window gained (`true`) or lost (`false`) focus.
    Focus(bool),
}
