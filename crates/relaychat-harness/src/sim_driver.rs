//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`relaychat_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Tests script inputs (key presses, transport deliveries) and read back what
//! the runtime did (frames sent, connections opened, notifications shown).
//! Each poll with nothing queued advances the virtual clock by one tick.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use relaychat_app::{App, AppEvent, Driver, DriverEvent, FileInfo, KeyInput, Notification};
use relaychat_client::{Environment, Epoch, Session};
use relaychat_proto::Frame;

use crate::{
    invariants::{InvariantRegistry, SessionSnapshot, SystemSnapshot},
    sim_env::{SimEnv, SimInstant},
};

/// Virtual time that passes on an idle poll.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Shared state for event injection.
#[derive(Default)]
struct SharedState {
    pending: VecDeque<DriverEvent>,
    outgoing: Vec<Frame>,
    notifications: Vec<Notification>,
    /// Epoch of the open transport. `None` while closed.
    open: Option<Epoch>,
    /// Every epoch the runtime opened, in order.
    opened: Vec<Epoch>,
    closes: usize,
    renders: usize,
    files: HashMap<String, FileInfo>,
    /// Session epochs seen at each render.
    epoch_history: Vec<Epoch>,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Clones share injected inputs and captured outputs, so a test can keep a
/// probe after handing the driver to a runtime.
#[derive(Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    env: SimEnv,
    tick: Duration,
    invariants: Option<Arc<InvariantRegistry>>,
}

impl SimDriver {
    /// Create a driver sharing the virtual clock of `env`.
    pub fn new(env: SimEnv) -> Self {
        Self {
            state: Arc::new(Mutex::new(SharedState::default())),
            env,
            tick: DEFAULT_TICK,
            invariants: None,
        }
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    /// Virtual time that passes on an idle poll.
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    fn state(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.state().pending.push_back(DriverEvent::App(event));
    }

    /// Inject key presses typing `text`.
    pub fn inject_text(&self, text: &str) {
        let mut state = self.state();
        for c in text.chars() {
            state.pending.push_back(DriverEvent::App(AppEvent::Key(KeyInput::Char(c))));
        }
    }

    /// Inject `text` followed by Enter.
    pub fn inject_line(&self, text: &str) {
        self.inject_text(text);
        self.inject_event(AppEvent::Key(KeyInput::Enter));
    }

    /// Inject a frame from the currently open transport.
    ///
    /// Dropped (as a real closed socket would) if no transport is open.
    pub fn inject_frame(&self, frame: Frame) {
        let mut state = self.state();
        if let Some(epoch) = state.open {
            state.pending.push_back(DriverEvent::Delivery { epoch, frame });
        }
    }

    /// Inject a frame tagged with an explicit epoch, e.g. one from a
    /// superseded connection.
    pub fn inject_frame_at(&self, epoch: Epoch, frame: Frame) {
        self.state().pending.push_back(DriverEvent::Delivery { epoch, frame });
    }

    /// Make a file available to `/attach`.
    pub fn add_file(&self, path: &str, file: FileInfo) {
        self.state().files.insert(path.to_string(), file);
    }

    /// Take all captured outgoing frames.
    pub fn take_outgoing(&self) -> Vec<Frame> {
        std::mem::take(&mut self.state().outgoing)
    }

    /// Take all notifications shown so far.
    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut self.state().notifications)
    }

    /// Epoch of the open transport.
    pub fn open_epoch(&self) -> Option<Epoch> {
        self.state().open
    }

    /// Every epoch opened so far.
    pub fn opened(&self) -> Vec<Epoch> {
        self.state().opened.clone()
    }

    /// Number of transport closes.
    pub fn closes(&self) -> usize {
        self.state().closes
    }

    /// Number of renders.
    pub fn renders(&self) -> usize {
        self.state().renders
    }

    /// True once the runtime stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.state().stopped
    }

    /// Check if there are pending inputs to process.
    pub fn has_pending(&self) -> bool {
        !self.state().pending.is_empty()
    }

    /// Shared environment.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn poll_event(&mut self) -> Result<Option<DriverEvent>, Self::Error> {
        let event = self.state().pending.pop_front();
        if event.is_none() {
            self.env.advance(self.tick);
        }
        Ok(event)
    }

    async fn open(&mut self, epoch: Epoch) -> Result<(), Self::Error> {
        tracing::debug!(%epoch, "sim transport opened");
        let mut state = self.state();
        state.open = Some(epoch);
        state.opened.push(epoch);
        Ok(())
    }

    async fn send(&mut self, frame: Frame) -> Result<(), Self::Error> {
        let mut state = self.state();
        if state.open.is_none() {
            return Err(SimDriverError(format!("send of {} while closed", frame.event)));
        }
        tracing::trace!(event = %frame.event, "frame captured");
        state.outgoing.push(frame);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state();
        state.open = None;
        state.closes += 1;
        Ok(())
    }

    fn now(&self) -> SimInstant {
        self.env.now()
    }

    fn render<E: Environment>(&mut self, _app: &App, session: &Session<E>) -> Result<(), Self::Error> {
        let history = {
            let mut state = self.state();
            state.renders += 1;
            let history = state.epoch_history.clone();
            state.epoch_history.push(session.epoch());
            history
        };

        if let Some(registry) = &self.invariants {
            let snapshot = SessionSnapshot::capture(session).with_history(history);
            registry.assert_all(&SystemSnapshot::single(snapshot), "after render");
        }
        Ok(())
    }

    fn notify(&mut self, notification: Notification) -> Result<(), Self::Error> {
        self.state().notifications.push(notification);
        Ok(())
    }

    fn describe_file(&self, path: &str) -> std::io::Result<FileInfo> {
        self.state().files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("{path} not found"))
        })
    }

    fn stop(&mut self) {
        let mut state = self.state();
        state.open = None;
        state.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames;

    #[test]
    fn frames_need_an_open_transport() {
        let driver = SimDriver::new(SimEnv::new());
        driver.inject_frame(frames::connect());
        assert!(!driver.has_pending());

        driver.inject_frame_at(Epoch::new(3), frames::connect());
        assert!(driver.has_pending());
    }

    #[test]
    fn inject_line_queues_keys_and_enter() {
        let driver = SimDriver::new(SimEnv::new());
        driver.inject_line("hi");

        let state = driver.state();
        assert_eq!(state.pending.len(), 3);
        assert_eq!(state.pending.back(), Some(&DriverEvent::App(AppEvent::Key(KeyInput::Enter))));
    }

    #[test]
    fn missing_file_is_not_found() {
        let driver = SimDriver::new(SimEnv::new());
        let err = driver.describe_file("nope.txt").err().map(|e| e.kind());
        assert_eq!(err, Some(std::io::ErrorKind::NotFound));
    }
}
