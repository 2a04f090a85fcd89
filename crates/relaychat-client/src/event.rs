//! Session events and actions.

use relaychat_core::{Epoch, StateField};
use relaychat_proto::{Frame, Message};

/// Inputs the caller feeds into the session.
///
/// The caller is responsible for:
/// - Forwarding transport deliveries tagged with the epoch they belong to
/// - Driving time forward via ticks
///
/// Generic over `I` (Instant type) so the same session runs on real and
/// virtual time.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent<I = std::time::Instant> {
    /// Frame delivered by the transport, server push or lifecycle report.
    Delivery {
        /// Epoch of the transport connection that produced the frame.
        epoch: Epoch,
        /// The frame.
        frame: Frame,
    },

    /// Time tick for debounce and join timeouts.
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// Notices for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    /// A room join was never confirmed and has been abandoned.
    JoinTimedOut {
        /// Room that was requested.
        room: String,
    },
    /// Transport gave up reconnecting.
    ReconnectFailed,
    /// A room switch was confirmed.
    RoomSwitched {
        /// New active room.
        room: String,
    },
}

/// Actions the session produces for the caller to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Open the transport under `epoch`, replacing any previous connection.
    Open {
        /// Epoch to tag deliveries from this connection with.
        epoch: Epoch,
    },

    /// Close the transport.
    Close,

    /// Send a frame to the server.
    Send(Frame),

    /// A message was appended to the log.
    ///
    /// Observed by the notification collaborator.
    Appended(Message),

    /// A piece of observable state changed; re-render.
    Changed(StateField),

    /// Something the user should be told about.
    Notice(SessionNotice),
}
