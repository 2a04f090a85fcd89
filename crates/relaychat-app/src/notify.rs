//! Desktop notification filter.
//!
//! Observes messages appended to the log and decides which deserve a desktop
//! notification: only while the host is unfocused, never for system notices,
//! never for the local user's own messages.

use relaychat_proto::Message;

/// Tag shared by all chat notifications so the host can coalesce them.
pub const NOTIFICATION_TAG: &str = "chat-message";

/// A desktop notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Title line.
    pub title: String,
    /// Message text.
    pub body: String,
    /// Coalescing tag.
    pub tag: &'static str,
}

/// Notification for `message`, if one should be shown.
///
/// `local_username` is the name the session logged in with; messages whose
/// sender matches it are self-originated.
pub fn notification_for(
    message: &Message,
    local_username: Option<&str>,
    focused: bool,
) -> Option<Notification> {
    if focused {
        return None;
    }

    let sender = message.sender()?;
    if local_username == Some(sender) {
        return None;
    }

    Some(Notification {
        title: format!("New message from {sender}"),
        body: message.text().to_string(),
        tag: NOTIFICATION_TAG,
    })
}
