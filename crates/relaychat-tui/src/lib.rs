//! Terminal UI for relay chat
//!
//! A thin shell over [`relaychat_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`relaychat_app::Runtime`].
//!
//! This crate only handles terminal rendering, key input and wiring the
//! WebSocket transport to the driver.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod terminal;
pub mod ui;

pub use relaychat_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
