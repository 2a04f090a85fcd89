//! Composer validation.
//!
//! Rules for what the user may submit: chat text, login names, room names and
//! file attachments. Attachments are never uploaded; a validated file becomes
//! a one-line label sent as an ordinary chat message.

use thiserror::Error;

/// Longest chat message, in characters.
pub const MAX_MESSAGE_LEN: usize = 500;

/// Longest username, in characters.
pub const MAX_USERNAME_LEN: usize = 20;

/// Largest attachable file.
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

/// MIME types that may be attached.
pub const ALLOWED_MIME_TYPES: [&str; 5] =
    ["image/jpeg", "image/png", "image/gif", "application/pdf", "text/plain"];

/// Rejected composer input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// Nothing left after trimming.
    #[error("{0} is empty")]
    Empty(&'static str),

    /// Over the length limit.
    #[error("{field} is {len} characters, limit is {max}")]
    TooLong {
        /// What was being validated.
        field: &'static str,
        /// Length after trimming.
        len: usize,
        /// Limit.
        max: usize,
    },
}

/// Rejected attachment.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttachmentError {
    /// File is over [`MAX_ATTACHMENT_BYTES`].
    #[error("file is {size} bytes, limit is {max}")]
    TooLarge {
        /// File size.
        size: u64,
        /// Limit.
        max: u64,
    },

    /// MIME type not in [`ALLOWED_MIME_TYPES`].
    #[error("file type {0} is not supported")]
    UnsupportedType(String),
}

/// Metadata of a file the user wants to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Display name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    pub mime: String,
}

fn bounded<'a>(field: &'static str, text: &'a str, max: usize) -> Result<&'a str, ComposeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ComposeError::Empty(field));
    }

    let len = trimmed.chars().count();
    if len > max {
        return Err(ComposeError::TooLong { field, len, max });
    }

    Ok(trimmed)
}

/// Validate chat text. Returns the trimmed text.
pub fn message(text: &str) -> Result<&str, ComposeError> {
    bounded("message", text, MAX_MESSAGE_LEN)
}

/// Validate a login name. Returns the trimmed name.
pub fn username(text: &str) -> Result<&str, ComposeError> {
    bounded("username", text, MAX_USERNAME_LEN)
}

/// Validate a room name. Returns the trimmed name.
pub fn room_name(text: &str) -> Result<&str, ComposeError> {
    let room = text.trim();
    if room.is_empty() { Err(ComposeError::Empty("room name")) } else { Ok(room) }
}

/// Build the chat label for an attachment, e.g. `[FILE] notes.txt (1.5KB)`.
pub fn attachment_label(file: &FileInfo) -> Result<String, AttachmentError> {
    if file.size > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentError::TooLarge { size: file.size, max: MAX_ATTACHMENT_BYTES });
    }
    if !ALLOWED_MIME_TYPES.contains(&file.mime.as_str()) {
        return Err(AttachmentError::UnsupportedType(file.mime.clone()));
    }

    let kib = file.size as f64 / 1024.0;
    Ok(format!("[FILE] {} ({kib:.1}KB)", file.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: u64, mime: &str) -> FileInfo {
        FileInfo { name: name.into(), size, mime: mime.into() }
    }

    #[test]
    fn message_is_trimmed() {
        assert_eq!(message("  hi there \n"), Ok("hi there"));
    }

    #[test]
    fn blank_message_rejected() {
        assert_eq!(message(" \t "), Err(ComposeError::Empty("message")));
    }

    #[test]
    fn message_limit_counts_characters() {
        let at_limit = "é".repeat(MAX_MESSAGE_LEN);
        assert!(message(&at_limit).is_ok());

        let over = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert_eq!(
            message(&over),
            Err(ComposeError::TooLong { field: "message", len: 501, max: 500 })
        );
    }

    #[test]
    fn username_limit() {
        assert_eq!(username(" alice "), Ok("alice"));
        assert!(matches!(username(&"a".repeat(21)), Err(ComposeError::TooLong { .. })));
    }

    #[test]
    fn attachment_label_format() {
        assert_eq!(
            attachment_label(&file("notes.txt", 1536, "text/plain")),
            Ok("[FILE] notes.txt (1.5KB)".to_string())
        );
        assert_eq!(
            attachment_label(&file("cat.png", 100, "image/png")),
            Ok("[FILE] cat.png (0.1KB)".to_string())
        );
    }

    #[test]
    fn attachment_limits() {
        assert_eq!(
            attachment_label(&file("big.pdf", MAX_ATTACHMENT_BYTES + 1, "application/pdf")),
            Err(AttachmentError::TooLarge { size: MAX_ATTACHMENT_BYTES + 1, max: MAX_ATTACHMENT_BYTES })
        );
        assert!(attachment_label(&file("max.pdf", MAX_ATTACHMENT_BYTES, "application/pdf")).is_ok());
        assert_eq!(
            attachment_label(&file("a.zip", 10, "application/zip")),
            Err(AttachmentError::UnsupportedType("application/zip".into()))
        );
    }
}
