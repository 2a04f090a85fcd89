//! Update policy per piece of session state.
//!
//! Most state changes only when the server says so. Local typing intent is the
//! exception: it changes on the local keystroke and the server learns about
//! it afterwards. Keeping the split in one table means a new field has to
//! pick a side explicitly.

use std::fmt;

/// Who may change a piece of state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdatePolicy {
    /// Changed by local input before the server knows.
    LocallyAuthoritative,
    /// Changed only by a server push or transport report.
    ServerConfirmed,
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateField {
    /// Connection lifecycle state.
    ConnectionState,
    /// Reconnect attempt counter.
    ReconnectionAttempts,
    /// Message log of the active room.
    Messages,
    /// Presence list.
    Users,
    /// Remote typing snapshot.
    RemoteTyping,
    /// Local typing intent.
    LocalTyping,
    /// Active room.
    ActiveRoom,
    /// Known-rooms cache.
    KnownRooms,
}

impl StateField {
    /// Every field.
    pub const ALL: [Self; 8] = [
        Self::ConnectionState,
        Self::ReconnectionAttempts,
        Self::Messages,
        Self::Users,
        Self::RemoteTyping,
        Self::LocalTyping,
        Self::ActiveRoom,
        Self::KnownRooms,
    ];

    /// Update policy of this field.
    pub fn policy(self) -> UpdatePolicy {
        match self {
            Self::LocalTyping => UpdatePolicy::LocallyAuthoritative,
            Self::ConnectionState
            | Self::ReconnectionAttempts
            | Self::Messages
            | Self::Users
            | Self::RemoteTyping
            | Self::ActiveRoom
            | Self::KnownRooms => UpdatePolicy::ServerConfirmed,
        }
    }

    /// Short name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionState => "connection_state",
            Self::ReconnectionAttempts => "reconnection_attempts",
            Self::Messages => "messages",
            Self::Users => "users",
            Self::RemoteTyping => "remote_typing",
            Self::LocalTyping => "local_typing",
            Self::ActiveRoom => "active_room",
            Self::KnownRooms => "known_rooms",
        }
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_local_typing_is_optimistic() {
        let optimistic: Vec<_> = StateField::ALL
            .into_iter()
            .filter(|f| f.policy() == UpdatePolicy::LocallyAuthoritative)
            .collect();

        assert_eq!(optimistic, vec![StateField::LocalTyping]);
    }
}
