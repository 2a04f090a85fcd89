//! Chat message payloads.
//!
//! On the wire a message is a flat object whose kind is implied by its
//! attributes: `system: true` marks a system notice, otherwise `isPrivate`
//! separates direct messages from room broadcasts. [`Message`] makes the kind
//! explicit and rejects chat messages that lack a sender.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProtocolError, UserId};

/// Opaque message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    /// Numeric id (the server uses millisecond timestamps).
    Number(u64),
    /// Textual id.
    Text(String),
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Kind of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Visible to everyone in the room.
    Broadcast,
    /// Visible only to sender and addressee.
    Private,
    /// Join/leave notice with no sender.
    System,
}

/// Message sent by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Message id.
    pub id: MessageId,
    /// Sender display name.
    pub sender: String,
    /// Sender id.
    pub sender_id: UserId,
    /// Message text.
    pub message: String,
    /// Server timestamp.
    pub timestamp: DateTime<Utc>,
    /// Direct message rather than room broadcast.
    pub is_private: bool,
}

/// Notice without sender identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemMessage {
    /// Message id.
    pub id: MessageId,
    /// Notice text.
    pub message: String,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Entry in a room's message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireMessage", into = "WireMessage")]
pub enum Message {
    /// Broadcast or private message from a user.
    Chat(ChatMessage),
    /// System notice.
    System(SystemMessage),
}

impl Message {
    /// Discriminate broadcast, private and system messages.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Chat(chat) if chat.is_private => MessageKind::Private,
            Self::Chat(_) => MessageKind::Broadcast,
            Self::System(_) => MessageKind::System,
        }
    }

    /// Message id.
    pub fn id(&self) -> &MessageId {
        match self {
            Self::Chat(chat) => &chat.id,
            Self::System(system) => &system.id,
        }
    }

    /// Message text.
    pub fn text(&self) -> &str {
        match self {
            Self::Chat(chat) => &chat.message,
            Self::System(system) => &system.message,
        }
    }

    /// Timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Chat(chat) => chat.timestamp,
            Self::System(system) => system.timestamp,
        }
    }

    /// Sender display name. `None` for system messages.
    pub fn sender(&self) -> Option<&str> {
        match self {
            Self::Chat(chat) => Some(&chat.sender),
            Self::System(_) => None,
        }
    }

    /// True for system notices.
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System(_))
    }
}

/// Flat wire representation shared by all message kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender_id: Option<UserId>,
    message: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system: Option<bool>,
}

impl TryFrom<WireMessage> for Message {
    type Error = ProtocolError;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        if wire.system.unwrap_or(false) {
            return Ok(Self::System(SystemMessage {
                id: wire.id,
                message: wire.message,
                timestamp: wire.timestamp,
            }));
        }

        let sender = wire.sender.ok_or(ProtocolError::MissingField("sender"))?;
        let sender_id = wire.sender_id.ok_or(ProtocolError::MissingField("senderId"))?;

        Ok(Self::Chat(ChatMessage {
            id: wire.id,
            sender,
            sender_id,
            message: wire.message,
            timestamp: wire.timestamp,
            is_private: wire.is_private.unwrap_or(false),
        }))
    }
}

impl From<Message> for WireMessage {
    fn from(message: Message) -> Self {
        match message {
            Message::Chat(chat) => Self {
                id: chat.id,
                sender: Some(chat.sender),
                sender_id: Some(chat.sender_id),
                message: chat.message,
                timestamp: chat.timestamp,
                is_private: Some(chat.is_private),
                system: None,
            },
            Message::System(system) => Self {
                id: system.id,
                sender: None,
                sender_id: None,
                message: system.message,
                timestamp: system.timestamp,
                is_private: None,
                system: Some(true),
            },
        }
    }
}

/// Payload of `send_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    /// Message text.
    pub message: String,
}

/// Payload of client-to-server `private_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateMessageRequest {
    /// Addressee id.
    pub to: UserId,
    /// Message text.
    pub message: String,
}

/// Payload of `load_messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadMessages {
    /// Room to page through.
    pub room: String,
    /// Load messages older than this timestamp.
    pub before: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_broadcast() {
        let msg: Message = serde_json::from_value(json!({
            "id": 1,
            "sender": "alice",
            "senderId": "s1",
            "message": "hi",
            "timestamp": "2024-05-01T10:00:00Z",
            "isPrivate": false,
        }))
        .unwrap();

        assert_eq!(msg.kind(), MessageKind::Broadcast);
        assert_eq!(msg.sender(), Some("alice"));
    }

    #[test]
    fn decodes_private_without_explicit_false() {
        let msg: Message = serde_json::from_value(json!({
            "id": "m-2",
            "sender": "bob",
            "senderId": 7,
            "message": "psst",
            "timestamp": "2024-05-01T10:00:00Z",
            "isPrivate": true,
        }))
        .unwrap();

        assert_eq!(msg.kind(), MessageKind::Private);
    }

    #[test]
    fn system_message_has_no_sender() {
        let msg: Message = serde_json::from_value(json!({
            "id": 3,
            "system": true,
            "message": "bob joined the chat",
            "timestamp": "2024-05-01T10:00:00Z",
        }))
        .unwrap();

        assert_eq!(msg.kind(), MessageKind::System);
        assert_eq!(msg.sender(), None);

        let wire = serde_json::to_value(&msg).unwrap();
        assert!(wire.get("sender").is_none());
        assert_eq!(wire["system"], json!(true));
    }

    #[test]
    fn chat_message_without_sender_is_rejected() {
        let result = serde_json::from_value::<Message>(json!({
            "id": 4,
            "message": "who am i",
            "timestamp": "2024-05-01T10:00:00Z",
        }));

        assert!(result.is_err());
    }
}
