//! Client session
//!
//! Action-based session synchronization core for relay chat clients. Keeps a
//! consistent local view of a chat room (connection status, message log,
//! presence, typing, active room) in the face of an unreliable link.
//!
//! # Architecture
//!
//! The session follows the same Sans-IO pattern as [`relaychat_core`]. It
//! receives events ([`SessionEvent`]) and local commands, processes them
//! through pure state machine logic, and returns actions ([`SessionAction`])
//! for the caller to execute.
//!
//! # Components
//!
//! - [`Session`]: top-level state machine
//! - [`SessionConfig`] / [`Identity`]: tunables and login identity
//! - [`SystemEnv`]: production environment
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides
//! [`transport::TransportHandle`], a WebSocket transport running in a
//! background task.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod event;
mod session;
mod system_env;

#[cfg(feature = "transport")]
pub mod transport;

pub use config::{DEFAULT_JOIN_TIMEOUT, Identity, SessionConfig};
pub use error::SessionError;
pub use event::{SessionAction, SessionEvent, SessionNotice};
pub use relaychat_core::{
    ConnectionState, Epoch, ReconnectPolicy, StateField, UpdatePolicy, env::Environment,
};
pub use session::Session;
pub use system_env::SystemEnv;
