//! WebSocket transport for the session.
//!
//! [`TransportHandle`] owns a background task that keeps one WebSocket open to
//! the relay and bridges it to channels. Protocol logic stays in the Sans-IO
//! [`crate::Session`]; this layer only moves frames and reports lifecycle
//! changes as synthesized `connect`, `disconnect`, `reconnect_attempt` and
//! `reconnect_failed` frames.
//!
//! Every delivery is tagged with the epoch of the `Open` that started the
//! connection, so the session can discard frames from a superseded socket.

use futures::{SinkExt, StreamExt};
use relaychat_core::{Epoch, ReconnectPolicy};
use relaychat_proto::{Frame, ServerEvent};
use thiserror::Error;
use tokio::{sync::mpsc, time::timeout};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message as WsMessage,
};
use tracing::{debug, info, warn};

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Transport task is gone.
    #[error("transport task stopped")]
    Stopped,
}

/// Commands for the transport task.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCommand {
    /// Open a connection under `epoch`, replacing any current one.
    Open {
        /// Epoch to tag deliveries with.
        epoch: Epoch,
    },
    /// Send a frame. Dropped while no socket is open.
    Send(Frame),
    /// Close the connection and stop retrying.
    Close,
}

/// Frame received from the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Epoch of the connection that produced the frame.
    pub epoch: Epoch,
    /// The frame.
    pub frame: Frame,
}

/// Handle to the background transport task.
pub struct TransportHandle {
    commands: mpsc::Sender<TransportCommand>,
    deliveries: mpsc::Receiver<Delivery>,
    abort_handle: tokio::task::AbortHandle,
}

impl TransportHandle {
    /// Spawn the transport task for `url`.
    ///
    /// The task stays idle until [`Self::open`]. Must be called from within
    /// a tokio runtime.
    pub fn spawn(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel(64);
        let (deliveries_tx, deliveries_rx) = mpsc::channel(256);

        let task = Task { url: url.into(), policy, commands: commands_rx, deliveries: deliveries_tx };
        let handle = tokio::spawn(task.run());

        Self { commands: commands_tx, deliveries: deliveries_rx, abort_handle: handle.abort_handle() }
    }

    /// Open a connection under `epoch`.
    ///
    /// # Errors
    ///
    /// `TransportError::Stopped` if the task is gone.
    pub async fn open(&self, epoch: Epoch) -> Result<(), TransportError> {
        self.command(TransportCommand::Open { epoch }).await
    }

    /// Queue a frame for the server.
    ///
    /// # Errors
    ///
    /// `TransportError::Stopped` if the task is gone.
    pub async fn send(&self, frame: Frame) -> Result<(), TransportError> {
        self.command(TransportCommand::Send(frame)).await
    }

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// `TransportError::Stopped` if the task is gone.
    pub async fn close(&self) -> Result<(), TransportError> {
        self.command(TransportCommand::Close).await
    }

    async fn command(&self, command: TransportCommand) -> Result<(), TransportError> {
        self.commands.send(command).await.map_err(|_| TransportError::Stopped)
    }

    /// Next delivery. `None` once the task has stopped.
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.deliveries.recv().await
    }

    /// Stop the transport task.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// How a connection under one epoch ended.
#[derive(Debug)]
enum Outcome {
    /// Closed locally or gave up; wait for the next open.
    Idle,
    /// A newer open superseded the connection.
    Reopen(Epoch),
    /// Handle dropped.
    Shutdown,
}

/// Why the socket pump returned.
enum Pump {
    Lost(String),
    Done(Outcome),
}

struct Task {
    url: String,
    policy: ReconnectPolicy,
    commands: mpsc::Receiver<TransportCommand>,
    deliveries: mpsc::Sender<Delivery>,
}

impl Task {
    async fn run(mut self) {
        let mut next: Option<Epoch> = None;

        loop {
            let epoch = match next.take() {
                Some(epoch) => epoch,
                None => match self.wait_for_open().await {
                    Some(epoch) => epoch,
                    None => break,
                },
            };

            match self.drive(epoch).await {
                Outcome::Idle => {},
                Outcome::Reopen(epoch) => next = Some(epoch),
                Outcome::Shutdown => break,
            }
        }

        debug!("transport task exited");
    }

    async fn wait_for_open(&mut self) -> Option<Epoch> {
        while let Some(command) = self.commands.recv().await {
            match command {
                TransportCommand::Open { epoch } => return Some(epoch),
                TransportCommand::Send(frame) => debug!(event = %frame.event, "dropped: not open"),
                TransportCommand::Close => {},
            }
        }
        None
    }

    /// Connect, pump and reconnect under one epoch.
    async fn drive(&mut self, epoch: Epoch) -> Outcome {
        let mut attempt: u32 = 0;

        loop {
            info!(url = %self.url, %epoch, attempt, "connecting");

            // The pending connect borrows the url; it must be gone before pump
            let result = {
                let connecting =
                    timeout(self.policy.connect_timeout, connect_async(self.url.as_str()));
                tokio::pin!(connecting);

                loop {
                    tokio::select! {
                        result = &mut connecting => break result,
                        command = self.commands.recv() => {
                            if let Some(outcome) = interrupt(command) {
                                return outcome;
                            }
                        },
                    }
                }
            };

            match result {
                Ok(Ok((socket, _response))) => {
                    attempt = 0;
                    if !self.deliver(epoch, ServerEvent::Connect).await {
                        return Outcome::Shutdown;
                    }

                    match self.pump(epoch, socket).await {
                        Pump::Done(outcome) => return outcome,
                        Pump::Lost(reason) => {
                            warn!(%reason, %epoch, "connection lost");
                            if !self.deliver(epoch, ServerEvent::Disconnect { reason }).await {
                                return Outcome::Shutdown;
                            }
                        },
                    }
                },
                Ok(Err(err)) => warn!(error = %err, %epoch, attempt, "connect failed"),
                Err(_) => warn!(timeout = ?self.policy.connect_timeout, %epoch, attempt, "connect timed out"),
            }

            attempt = attempt.saturating_add(1);
            if !self.policy.allows(attempt) {
                warn!(%epoch, attempts = attempt - 1, "giving up");
                if !self.deliver(epoch, ServerEvent::ReconnectFailed).await {
                    return Outcome::Shutdown;
                }
                return Outcome::Idle;
            }

            let backoff = tokio::time::sleep(self.policy.delay_for(attempt));
            tokio::pin!(backoff);
            loop {
                tokio::select! {
                    () = &mut backoff => break,
                    command = self.commands.recv() => {
                        if let Some(outcome) = interrupt(command) {
                            return outcome;
                        }
                    },
                }
            }

            if !self.deliver(epoch, ServerEvent::ReconnectAttempt { attempt }).await {
                return Outcome::Shutdown;
            }
        }
    }

    /// Bridge an open socket to the channels until it closes.
    async fn pump(&mut self, epoch: Epoch, socket: Socket) -> Pump {
        let (mut sink, mut stream) = socket.split();

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let outcome = match command {
                        Some(TransportCommand::Send(frame)) => {
                            let text = match frame.encode() {
                                Ok(text) => text,
                                Err(err) => {
                                    warn!(error = %err, event = %frame.event, "failed to encode frame");
                                    continue;
                                },
                            };
                            if let Err(err) = sink.send(WsMessage::Text(text.into())).await {
                                return Pump::Lost(err.to_string());
                            }
                            continue;
                        },
                        Some(TransportCommand::Open { epoch }) => Outcome::Reopen(epoch),
                        Some(TransportCommand::Close) => Outcome::Idle,
                        None => Outcome::Shutdown,
                    };

                    if let Err(err) = sink.close().await {
                        debug!(error = %err, "close handshake failed");
                    }
                    return Pump::Done(outcome);
                },
                message = stream.next() => match message {
                    Some(Ok(WsMessage::Text(text))) => match Frame::decode(text.as_str()) {
                        Ok(frame) => {
                            if self.deliveries.send(Delivery { epoch, frame }).await.is_err() {
                                return Pump::Done(Outcome::Shutdown);
                            }
                        },
                        Err(err) => warn!(error = %err, "dropped undecodable frame"),
                    },
                    Some(Ok(WsMessage::Close(close))) => {
                        let reason = close.map_or_else(
                            || "transport close".to_string(),
                            |frame| frame.reason.to_string(),
                        );
                        return Pump::Lost(reason);
                    },
                    Some(Ok(_)) => {},
                    Some(Err(err)) => return Pump::Lost(err.to_string()),
                    None => return Pump::Lost("transport close".to_string()),
                },
            }
        }
    }

    /// Deliver a synthesized lifecycle frame. `false` if the handle is gone.
    async fn deliver(&self, epoch: Epoch, event: ServerEvent) -> bool {
        let frame = match event.into_frame() {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "failed to encode lifecycle frame");
                return true;
            },
        };

        self.deliveries.send(Delivery { epoch, frame }).await.is_ok()
    }
}

/// Apply a command received while no socket is open.
///
/// Returns the outcome if the command ends the current epoch.
fn interrupt(command: Option<TransportCommand>) -> Option<Outcome> {
    match command {
        Some(TransportCommand::Open { epoch }) => Some(Outcome::Reopen(epoch)),
        Some(TransportCommand::Close) => Some(Outcome::Idle),
        Some(TransportCommand::Send(frame)) => {
            debug!(event = %frame.event, "dropped: not connected");
            None
        },
        None => Some(Outcome::Shutdown),
    }
}
