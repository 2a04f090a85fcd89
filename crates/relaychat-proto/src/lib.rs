//! Relay chat wire protocol
//!
//! Every message exchanged with the relay server is a [`Frame`]: a named event
//! plus an optional JSON payload, carried as one WebSocket text message.
//!
//! # Directions
//!
//! - [`ClientCommand`]: requests the client emits (`user_join`,
//!   `send_message`, ...). Fire-and-forget; results arrive later as events.
//! - [`ServerEvent`]: notifications pushed by the server, plus the connection
//!   lifecycle notifications synthesized by the transport (`connect`,
//!   `disconnect`, `reconnect_attempt`, `reconnect_failed`).
//!
//! Decoding is strict about shape and lenient about representation: ids may
//! be numbers or strings, and scalar payloads may arrive bare or wrapped in an
//! object.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
mod event;
mod frame;
pub mod payloads;

pub use errors::ProtocolError;
pub use event::{ClientCommand, ClientEventName, ServerEvent, ServerEventName};
pub use frame::Frame;
pub use payloads::{
    chat::{ChatMessage, Message, MessageId, MessageKind, SystemMessage},
    presence::{PresenceNotice, User, UserId},
};
