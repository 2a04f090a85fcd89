//! Builders for server pushes and transport lifecycle frames.
//!
//! Frames are built from raw JSON in the relay's wire shape (camelCase fields,
//! bare scalar payloads) so tests exercise the real decoder.

use relaychat_proto::Frame;
use serde_json::{Value, json};

/// Frame with an arbitrary name and payload.
pub fn raw(event: &str, data: Value) -> Frame {
    Frame { event: event.to_string(), data }
}

/// Transport connected.
pub fn connect() -> Frame {
    raw("connect", Value::Null)
}

/// Transport lost.
pub fn disconnect(reason: &str) -> Frame {
    raw("disconnect", json!(reason))
}

/// Transport retry `attempt` (one-based).
pub fn reconnect_attempt(attempt: u32) -> Frame {
    raw("reconnect_attempt", json!(attempt))
}

/// Transport gave up.
pub fn reconnect_failed() -> Frame {
    raw("reconnect_failed", Value::Null)
}

/// Wire object of a broadcast message. `secs` is the Unix timestamp.
pub fn chat_json(id: u64, sender: &str, text: &str, secs: i64) -> Value {
    json!({
        "id": id,
        "sender": sender,
        "senderId": format!("sid-{sender}"),
        "message": text,
        "timestamp": timestamp(secs),
        "isPrivate": false,
    })
}

/// Room broadcast.
pub fn receive_message(id: u64, sender: &str, text: &str, secs: i64) -> Frame {
    raw("receive_message", chat_json(id, sender, text, secs))
}

/// Direct message.
pub fn private_message(id: u64, sender: &str, text: &str, secs: i64) -> Frame {
    let mut message = chat_json(id, sender, text, secs);
    message["isPrivate"] = json!(true);
    raw("private_message", message)
}

/// History snapshot, oldest first.
pub fn message_history(messages: Vec<Value>) -> Frame {
    raw("message_history", Value::Array(messages))
}

/// Presence snapshot of `(id, username)` pairs.
pub fn user_list(users: &[(u64, &str)]) -> Frame {
    let users: Vec<Value> =
        users.iter().map(|(id, name)| json!({ "id": id, "username": name })).collect();
    raw("user_list", Value::Array(users))
}

/// A user entered the room.
pub fn user_joined(username: &str) -> Frame {
    raw("user_joined", json!({ "username": username }))
}

/// A user left the room.
pub fn user_left(username: &str) -> Frame {
    raw("user_left", json!({ "username": username }))
}

/// Typing snapshot.
pub fn typing_users(users: &[&str]) -> Frame {
    raw("typing_users", json!(users))
}

/// Room switch confirmed.
pub fn room_joined(room: &str) -> Frame {
    raw("room_joined", json!(room))
}

fn timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0).unwrap_or_default().to_rfc3339()
}
