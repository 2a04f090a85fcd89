//! Error types for the session core.
//!
//! None of these cross the command boundary: commands are fire-and-forget,
//! so callers log the error and leave state untouched.

use thiserror::Error;

use crate::connection::{ConnectionState, LifecycleEvent};

/// Errors from the connection lifecycle state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The event is not valid in the current state.
    #[error("invalid transition: {event:?} in state {state}")]
    InvalidTransition {
        /// State when the event arrived.
        state: ConnectionState,
        /// Rejected event.
        event: LifecycleEvent,
    },

    /// `connect()` while a connection is already live or being established.
    #[error("connect requested while {0}")]
    AlreadyActive(ConnectionState),
}

impl ConnectionError {
    /// True if the event most likely came from a superseded connection.
    ///
    /// Lifecycle events arriving while disconnected or failed cannot belong to
    /// the current connection attempt.
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition {
                state: ConnectionState::Disconnected | ConnectionState::Failed,
                ..
            }
        )
    }
}

/// Errors from room switch requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Room name is empty after trimming.
    #[error("room name is empty")]
    EmptyName,

    /// Room is already the active room.
    #[error("already in room {0}")]
    AlreadyActive(String),
}
