//! Presence payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque user identifier assigned by the relay server.
///
/// Servers identify users by connection id strings or numeric ids; both are
/// accepted and compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    /// Numeric id.
    Number(u64),
    /// Textual id.
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A user present in a room, as listed in `user_list` snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub username: String,
}

impl User {
    /// Create a user.
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self { id: id.into(), username: username.into() }
    }
}

/// Payload of `user_joined` / `user_left`.
///
/// Only the username is needed to render the notice; the id is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceNotice {
    /// Id of the user, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    /// Display name.
    pub username: String,
}

impl PresenceNotice {
    /// Notice carrying only a username.
    pub fn named(username: impl Into<String>) -> Self {
        Self { id: None, username: username.into() }
    }
}

impl From<User> for PresenceNotice {
    fn from(user: User) -> Self {
        Self { id: Some(user.id), username: user.username }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn user_id_accepts_numbers_and_strings() {
        let numeric: User = serde_json::from_value(json!({"id": 1, "username": "alice"})).unwrap();
        let textual: User =
            serde_json::from_value(json!({"id": "Zx9", "username": "bob"})).unwrap();

        assert_eq!(numeric.id, UserId::Number(1));
        assert_eq!(textual.id, UserId::Text("Zx9".into()));
    }

    #[test]
    fn notice_without_id() {
        let notice: PresenceNotice = serde_json::from_value(json!({"username": "bob"})).unwrap();
        assert_eq!(notice, PresenceNotice::named("bob"));
    }
}
