//! Deterministic simulation harness for relay chat sessions.
//!
//! Virtual-time implementations of the Environment and Driver traits so the
//! production [`relaychat_app::Runtime`] and [`relaychat_client::Session`] can
//! be driven step by step, reproducibly.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! session invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod frames;
pub mod invariants;
pub mod sim_driver;
pub mod sim_env;

pub use invariants::{
    ActiveRoomKnown, AttemptsResetWhenConnected, BindingsMatchAttachment, EpochMonotonicity,
    Invariant, InvariantRegistry, InvariantResult, NoTypingWhileOffline, PendingJoinNotActive,
    SessionSnapshot, SystemSnapshot, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::{SimEnv, SimInstant};
