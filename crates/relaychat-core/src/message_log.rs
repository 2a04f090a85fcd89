//! Ordered message log for the active room.
//!
//! Entries are kept in arrival order. The log never sorts by timestamp: the
//! server's ordering is authoritative, and locally synthesized notices are
//! placed exactly where the triggering event arrived.

use chrono::{DateTime, Utc};
use relaychat_proto::{Message, MessageId, SystemMessage};

/// Presence change that produces a system notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceChange {
    /// User entered the room.
    Joined,
    /// User left the room.
    Left,
}

impl PresenceChange {
    /// Notice text shown in the log.
    pub fn notice(self, username: &str) -> String {
        match self {
            Self::Joined => format!("{username} joined the chat"),
            Self::Left => format!("{username} left the chat"),
        }
    }

    /// Build the system message for this change.
    ///
    /// Ids of synthesized notices are opaque text so they never collide with
    /// numeric server ids.
    pub fn system_message(self, username: &str, nonce: u64, at: DateTime<Utc>) -> Message {
        Message::System(SystemMessage {
            id: MessageId::Text(format!("local-{nonce:016x}")),
            message: self.notice(username),
            timestamp: at,
        })
    }
}

/// Append-only (until cleared) list of messages for the active room.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Vec<Message>,
}

impl MessageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one message at the end.
    pub fn append(&mut self, message: Message) {
        self.entries.push(message);
    }

    /// Replace the whole log with a history snapshot (oldest first).
    pub fn replace_with_history(&mut self, history: Vec<Message>) {
        self.entries = history;
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries, in arrival order.
    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }

    /// Oldest entry. Its timestamp is the cursor for paging older history.
    pub fn first(&self) -> Option<&Message> {
        self.entries.first()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
