//! Frame envelope.
//!
//! A `Frame` is the unit of transport: `{"event": <name>, "data": <payload>}`.
//! It holds the payload as an untyped JSON value so the receiver can route by
//! name before committing to a payload type.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::errors::{ProtocolError, Result};

/// Named event with an untyped JSON payload.
///
/// # Invariants
///
/// - `event` is never empty for frames produced by [`Frame::new`] or accepted
///   by [`Frame::decode`].
/// - A payload-less event carries [`Value::Null`] and omits `data` on the
///   wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name.
    pub event: String,

    /// Event payload. `Null` when the event carries none.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Frame {
    /// Build a frame by serializing `payload`.
    pub fn new(event: impl Into<String>, payload: &impl Serialize) -> Result<Self> {
        let event = event.into();
        if event.is_empty() {
            return Err(ProtocolError::EmptyEventName);
        }
        let data = serde_json::to_value(payload).map_err(|e| ProtocolError::Encode(e.to_string()))?;
        Ok(Self { event, data })
    }

    /// Build a frame with no payload.
    pub fn bare(event: impl Into<String>) -> Self {
        Self { event: event.into(), data: Value::Null }
    }

    /// Encode as JSON text.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Decode from JSON text.
    ///
    /// Only the envelope is validated here. Payload shape is checked when a
    /// receiver calls [`Frame::payload`].
    pub fn decode(text: &str) -> Result<Self> {
        let frame: Self =
            serde_json::from_str(text).map_err(|e| ProtocolError::MalformedFrame(e.to_string()))?;
        if frame.event.is_empty() {
            return Err(ProtocolError::EmptyEventName);
        }
        Ok(frame)
    }

    /// Deserialize the payload into `T`.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.data).map_err(|e| ProtocolError::invalid_payload(&self.event, &e))
    }
}
