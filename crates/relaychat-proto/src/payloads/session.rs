//! Login, room and transport lifecycle payloads.
//!
//! Scalar payloads (`room_joined`, `disconnect`, `reconnect_attempt`) are
//! emitted bare by the relay server but are also accepted wrapped in a
//! single-field object.

use serde::{Deserialize, Serialize};

/// Payload of `user_join`: identity presented on connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserJoin {
    /// Display name.
    pub username: String,
    /// Room to enter.
    pub room: String,
}

/// Payload of `room_joined`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomJoined {
    /// Bare room name.
    Bare(String),
    /// `{"roomName": ...}`.
    Wrapped {
        /// Confirmed room.
        #[serde(rename = "roomName")]
        room_name: String,
    },
}

impl RoomJoined {
    /// Confirmed room name.
    pub fn into_room_name(self) -> String {
        match self {
            Self::Bare(name) | Self::Wrapped { room_name: name } => name,
        }
    }
}

/// Payload of `disconnect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Disconnect {
    /// Bare reason string.
    Bare(String),
    /// `{"reason": ...}`.
    Wrapped {
        /// Why the transport closed.
        reason: String,
    },
}

impl Disconnect {
    /// Disconnect reason.
    pub fn into_reason(self) -> String {
        match self {
            Self::Bare(reason) | Self::Wrapped { reason } => reason,
        }
    }
}

/// Payload of `reconnect_attempt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReconnectAttempt {
    /// Bare attempt number.
    Bare(u32),
    /// `{"attemptNumber": ...}`.
    Wrapped {
        /// One-based attempt number.
        #[serde(rename = "attemptNumber")]
        attempt_number: u32,
    },
}

impl ReconnectAttempt {
    /// One-based attempt number.
    pub fn attempt(&self) -> u32 {
        match self {
            Self::Bare(n) | Self::Wrapped { attempt_number: n } => *n,
        }
    }
}
