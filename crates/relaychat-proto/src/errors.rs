//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding frames and payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame text is not a valid JSON envelope.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Frame carries an empty event name.
    #[error("frame has an empty event name")]
    EmptyEventName,

    /// Event name is not part of the protocol.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Payload does not match the shape the event requires.
    #[error("invalid payload for {event}: {reason}")]
    InvalidPayload {
        /// Event whose payload failed to decode.
        event: String,
        /// Decoder diagnostic.
        reason: String,
    },

    /// A chat message is missing a field its kind requires.
    #[error("message missing required field `{0}`")]
    MissingField(&'static str),

    /// Payload could not be serialized.
    #[error("failed to encode payload: {0}")]
    Encode(String),
}

impl ProtocolError {
    /// Build an [`ProtocolError::InvalidPayload`] from a serde diagnostic.
    pub(crate) fn invalid_payload(event: &str, err: &serde_json::Error) -> Self {
        Self::InvalidPayload { event: event.to_string(), reason: err.to_string() }
    }
}
