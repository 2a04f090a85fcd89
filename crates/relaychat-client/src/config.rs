//! Session configuration.

use std::time::Duration;

use relaychat_core::{
    rooms::{DEFAULT_ROOM, DEFAULT_ROOMS},
    typing::DEFAULT_TYPING_DEBOUNCE,
};

/// Default time to wait for a `room_joined` confirmation.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity presented to the relay on every connect acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Display name.
    pub username: String,
    /// Room to enter on first connect.
    ///
    /// Seeds the known-rooms cache along with [`SessionConfig::default_rooms`]
    /// so the active room is always listed, even before the server confirms
    /// it. Ignored once any `room_joined` has been confirmed.
    pub room: String,
}

impl Identity {
    /// Identity entering `room`.
    pub fn new(username: impl Into<String>, room: impl Into<String>) -> Self {
        Self { username: username.into(), room: room.into() }
    }
}

/// Tunables for a [`crate::Session`].
///
/// Retry timing is configured on the transport, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Inactivity window before local typing stops.
    pub typing_debounce: Duration,
    /// Give up on an unconfirmed room join after this long. `None` waits
    /// forever.
    pub join_timeout: Option<Duration>,
    /// Rooms known before any server confirmation.
    pub default_rooms: Vec<String>,
    /// Active room before the first connect.
    pub default_room: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            typing_debounce: DEFAULT_TYPING_DEBOUNCE,
            join_timeout: Some(DEFAULT_JOIN_TIMEOUT),
            default_rooms: DEFAULT_ROOMS.iter().map(ToString::to_string).collect(),
            default_room: DEFAULT_ROOM.to_string(),
        }
    }
}
