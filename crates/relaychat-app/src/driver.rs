//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use relaychat_client::{Environment, Epoch, Session};
use relaychat_proto::Frame;

use crate::{App, AppEvent, FileInfo, Notification};

/// Input the driver hands to the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    /// User or host window input, for the [`App`].
    App(AppEvent),

    /// Frame from the transport, for the session.
    Delivery {
        /// Epoch of the connection that produced the frame.
        epoch: Epoch,
        /// The frame.
        frame: Frame,
    },
}

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in production and simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, tokio-tungstenite for the relay
/// - **Simulation**: scripted events and deliveries, captured frames
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Wait for the next input.
    ///
    /// Returns `None` when nothing arrived within the driver's tick interval.
    fn poll_event(
        &mut self,
    ) -> impl Future<Output = Result<Option<DriverEvent>, Self::Error>> + Send;

    /// Open the transport under `epoch`, replacing any current connection.
    fn open(&mut self, epoch: Epoch) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Send a frame to the server.
    fn send(&mut self, frame: Frame) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Close the transport.
    fn close(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application and session state.
    fn render<E: Environment>(&mut self, app: &App, session: &Session<E>) -> Result<(), Self::Error>;

    /// Show a desktop notification.
    fn notify(&mut self, notification: Notification) -> Result<(), Self::Error>;

    /// Look up metadata of a file the user wants to attach.
    fn describe_file(&self, path: &str) -> std::io::Result<FileInfo>;

    /// Stop the transport and clean up resources.
    fn stop(&mut self);
}
