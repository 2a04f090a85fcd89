//! Application layer for relay chat
//!
//! Pure state machines and a generic runtime for UI and session
//! orchestration, enabling deterministic simulation testing with the same code
//! that runs in production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (login, composer, slash commands, focus)
//! - [`Driver`]: trait for platform-specific I/O abstraction
//! - [`Runtime`]: generic orchestration loop using Driver
//! - [`compose`]: composer and attachment validation
//! - [`notify`]: desktop notification filter

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
pub mod compose;
mod driver;
mod event;
mod input;
pub mod notify;
mod runtime;

pub use action::AppAction;
pub use app::{App, Screen};
pub use compose::{AttachmentError, ComposeError, FileInfo};
pub use driver::{Driver, DriverEvent};
pub use event::AppEvent;
pub use input::KeyInput;
pub use notify::Notification;
pub use runtime::Runtime;
