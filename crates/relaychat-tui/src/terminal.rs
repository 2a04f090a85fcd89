//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The relay connection is a
//! [`TransportHandle`] running in a background task.

use std::{
    io::{self, Stdout, stdout},
    path::Path,
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand,
    event::{
        DisableFocusChange, EnableFocusChange, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    style::Print,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use relaychat_app::{App, AppEvent, Driver, DriverEvent, FileInfo, KeyInput, Notification};
use relaychat_client::{
    Environment, Epoch, ReconnectPolicy, Session,
    transport::{Delivery, TransportError, TransportHandle},
};
use relaychat_proto::Frame;
use thiserror::Error;

use crate::ui;

/// Wait this long for input before ticking the session.
const TICK: Duration = Duration::from_millis(100);

/// MIME type of files whose extension is not recognized.
const UNKNOWN_MIME: &str = "application/octet-stream";

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Terminal event stream ended.
    #[error("terminal input closed")]
    InputClosed,
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui) and the relay
/// connection (tokio-tungstenite via [`TransportHandle`]).
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    transport: TransportHandle,
    /// Ring the terminal bell for notifications.
    bell: bool,
}

impl TerminalDriver {
    /// Take over the terminal and spawn the transport task for `url`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(url: &str, policy: ReconnectPolicy, bell: bool) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(EnableFocusChange)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();
        let transport = TransportHandle::spawn(url, policy);

        Ok(Self { terminal, event_stream, transport, bell })
    }

    /// Convert a crossterm event to an `AppEvent`.
    fn convert_event(event: Event) -> Option<AppEvent> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Self::convert_key(key).map(AppEvent::Key)
            },
            Event::Resize(cols, rows) => Some(AppEvent::Resize(cols, rows)),
            Event::FocusGained => Some(AppEvent::Focus(true)),
            Event::FocusLost => Some(AppEvent::Focus(false)),
            _ => None,
        }
    }

    /// Convert a crossterm key to `KeyInput`. Ctrl+C quits like Esc.
    fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return matches!(key.code, KeyCode::Char('c')).then_some(KeyInput::Esc);
        }

        match key.code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::PageUp => Some(KeyInput::PageUp),
            KeyCode::PageDown => Some(KeyInput::PageDown),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<DriverEvent>, Self::Error> {
        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => match maybe_event {
                Some(Ok(event)) => Ok(Self::convert_event(event).map(DriverEvent::App)),
                Some(Err(e)) => Err(TerminalError::Io(e)),
                None => Err(TerminalError::InputClosed),
            },

            // Frames and lifecycle reports from the transport
            delivery = self.transport.recv() => match delivery {
                Some(Delivery { epoch, frame }) => Ok(Some(DriverEvent::Delivery { epoch, frame })),
                None => Err(TerminalError::Transport(TransportError::Stopped)),
            },

            // Tick timeout
            () = tokio::time::sleep(TICK) => Ok(None),
        }
    }

    async fn open(&mut self, epoch: Epoch) -> Result<(), Self::Error> {
        Ok(self.transport.open(epoch).await?)
    }

    async fn send(&mut self, frame: Frame) -> Result<(), Self::Error> {
        Ok(self.transport.send(frame).await?)
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        Ok(self.transport.close().await?)
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn render<E: Environment>(&mut self, app: &App, session: &Session<E>) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app, session))?;
        Ok(())
    }

    fn notify(&mut self, notification: Notification) -> Result<(), Self::Error> {
        tracing::info!(title = %notification.title, tag = notification.tag, "notification");
        if self.bell {
            stdout().execute(Print('\u{7}'))?;
        }
        Ok(())
    }

    fn describe_file(&self, path: &str) -> io::Result<FileInfo> {
        let path = Path::new(path);
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
        }

        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        Ok(FileInfo { name, size: metadata.len(), mime: mime_for(path).to_string() })
    }

    fn stop(&mut self) {
        self.transport.stop();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = stdout().execute(DisableFocusChange);
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

/// MIME type guessed from the file extension.
fn mime_for(path: &Path) -> &'static str {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return UNKNOWN_MIME;
    };

    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" | "log" | "md" => "text/plain",
        _ => UNKNOWN_MIME,
    }
}
