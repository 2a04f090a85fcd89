//! Session errors.
//!
//! Commands are fire-and-forget, so these never reach the caller of a command.
//! The session logs them and drops the offending input; they are exposed for
//! tests and for [`crate::Session::try_handle`].

use relaychat_core::{ConnectionError, Epoch, RoomError};
use relaychat_proto::{ProtocolError, ServerEventName};
use thiserror::Error;

/// Errors raised while applying an input to the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Frame could not be decoded into a server event.
    #[error("malformed frame: {0}")]
    Protocol(#[from] ProtocolError),

    /// Lifecycle event not valid in the current connection state.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Room switch request rejected.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Delivery tagged with a superseded connection epoch.
    #[error("stale delivery from epoch {delivered} (current {current})")]
    StaleDelivery {
        /// Epoch the delivery was tagged with.
        delivered: Epoch,
        /// Current connection epoch.
        current: Epoch,
    },

    /// No handler bound for the event (session torn down).
    #[error("no handler bound for {0}")]
    Unbound(ServerEventName),

    /// Command requires a live connection.
    #[error("not connected")]
    NotConnected,

    /// Message text is blank.
    #[error("message is empty")]
    EmptyMessage,
}

impl SessionError {
    /// True for errors that are expected during normal operation and only
    /// worth a debug log.
    pub fn is_benign(&self) -> bool {
        match self {
            Self::StaleDelivery { .. } | Self::Unbound(_) => true,
            Self::Connection(err) => err.is_stale(),
            Self::Protocol(_) | Self::Room(_) | Self::NotConnected | Self::EmptyMessage => false,
        }
    }
}
