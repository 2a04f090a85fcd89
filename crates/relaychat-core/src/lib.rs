//! Relay chat core
//!
//! Pure state machines for the client-side session: no sockets, no timers, no
//! clocks. Time enters as method arguments and side effects leave as return
//! values, so every component can be driven deterministically in tests.
//!
//! # Components
//!
//! - [`connection`]: connection lifecycle state machine and reconnect policy
//! - [`registry`]: event subscription registry with per-observer teardown
//! - [`message_log`]: ordered chat log and system notice synthesis
//! - [`presence`]: snapshot-replaced presence list
//! - [`typing`]: remote typing snapshot and local debounced typing intent
//! - [`rooms`]: room switch coordinator
//! - [`policy`]: which state is locally authoritative vs server-confirmed
//! - [`env`]: time and randomness abstraction

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod connection;
pub mod env;
pub mod error;
pub mod message_log;
pub mod policy;
pub mod presence;
pub mod registry;
pub mod rooms;
pub mod typing;

pub use connection::{Connection, ConnectionState, Epoch, LifecycleEvent, ReconnectPolicy, Transition};
pub use env::Environment;
pub use error::{ConnectionError, RoomError};
pub use message_log::{MessageLog, PresenceChange};
pub use policy::{StateField, UpdatePolicy};
pub use presence::Presence;
pub use registry::{ObserverId, Registry};
pub use rooms::{PendingJoin, RoomSwitch, RoomSwitchCoordinator};
pub use typing::{TypingIndicator, TypingSignal};
