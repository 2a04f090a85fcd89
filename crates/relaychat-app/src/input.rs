//! Terminal-agnostic keyboard input.

/// Keyboard input abstraction.
///
/// Decouples the composer from terminal libraries so the same key sequences
/// can be replayed in simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Submit the composer.
    Enter,
    /// Delete the character before the cursor.
    Backspace,
    /// Delete the character at the cursor.
    Delete,
    /// Switch to the next known room.
    Tab,
    /// Quit.
    Esc,
    /// Cursor left.
    Left,
    /// Cursor right.
    Right,
    /// Scroll the log back.
    PageUp,
    /// Scroll the log forward.
    PageDown,
    /// Cursor to start.
    Home,
    /// Cursor to end.
    End,
}
