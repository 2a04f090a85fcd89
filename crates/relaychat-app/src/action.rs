//! Intents produced by the [`crate::App`] for the runtime to carry out.

use relaychat_client::Identity;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Connect as `identity`.
    Connect {
        /// Login identity.
        identity: Identity,
    },

    /// Drop the connection.
    Disconnect,

    /// Broadcast a message to the active room.
    SendMessage {
        /// Validated, trimmed text.
        text: String,
    },

    /// Message one user directly.
    SendPrivate {
        /// Recipient username.
        to: String,
        /// Validated, trimmed text.
        text: String,
    },

    /// The composer was edited.
    Keystroke,

    /// Switch to `room`, creating it if unknown.
    JoinRoom {
        /// Trimmed room name.
        room: String,
    },

    /// Switch to the room after the active one in the known-rooms list.
    NextRoom,

    /// Request the page of history before the oldest loaded message.
    LoadOlder,

    /// Attach the file at `path` as a labelled message.
    Attach {
        /// Local file path.
        path: String,
    },
}
