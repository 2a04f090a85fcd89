//! Connection lifecycle state machine.
//!
//! Tracks the client's view of the single relay connection and the number of
//! reconnect attempts since the last successful connect. Local commands enter
//! through [`Connection::connect`] and [`Connection::disconnect`]; everything
//! else arrives as a [`LifecycleEvent`] reported by the transport.
//!
//! # State Machine
//!
//! ```text
//!                 connect()              Acknowledged
//! ┌──────────────┐────────>┌────────────┐──────────>┌───────────┐
//! │ Disconnected │         │ Connecting │           │ Connected │
//! └──────────────┘         └────────────┘           └───────────┘
//!        ^                                           │        ^
//!        │ disconnect()                         Lost │        │ Acknowledged
//!        │ (from any state)                          v        │
//!        │                 ┌────────┐  GaveUp  ┌──────────────┐
//!        │                 │ Failed │<─────────│ Reconnecting │
//!        │                 └────────┘          └──────────────┘
//!        │                      │ connect()
//!        └──────────────────────┘──────> Connecting
//! ```
//!
//! Every `connect()` and every effective `disconnect()` advances the
//! connection [`Epoch`]. The transport tags what it reports with the epoch it
//! was opened under, so reports from a superseded connection can be discarded
//! before they reach this machine.

use std::{fmt, time::Duration};

use crate::error::ConnectionError;

/// Delay before the first reconnect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// Ceiling on the delay between reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY_MAX: Duration = Duration::from_millis(5000);

/// Time allowed for a single connect attempt before it is abandoned.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(20_000);

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No connection and none requested.
    #[default]
    Disconnected,
    /// Initial connection in progress.
    Connecting,
    /// Connection acknowledged by the server.
    Connected,
    /// Connection lost unexpectedly; transport is retrying.
    Reconnecting,
    /// Transport gave up. Terminal until the next `connect()`.
    Failed,
}

impl ConnectionState {
    /// Lowercase name, as shown to users and in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Failed => "failed",
        }
    }

    /// True only in [`ConnectionState::Connected`].
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-reported lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Server acknowledged the connection.
    Acknowledged,
    /// Transport dropped without a local `disconnect()`.
    Lost,
    /// Transport started reconnect attempt `n` (one-based).
    Attempt(u32),
    /// Transport gave up reconnecting.
    GaveUp,
}

/// Generation counter for connection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    /// Wrap a raw epoch value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw epoch value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The epoch after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A state change produced by [`Connection::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before the event.
    pub from: ConnectionState,
    /// State after the event. May equal `from`.
    pub to: ConnectionState,
}

impl Transition {
    /// True if the state actually changed.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Retry timing for the transport.
///
/// Delays double from `initial_delay` and are clamped to `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first attempt.
    pub initial_delay: Duration,
    /// Ceiling on the delay between attempts.
    pub max_delay: Duration,
    /// Per-attempt connect timeout.
    pub connect_timeout: Duration,
    /// Attempt limit. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_RECONNECT_DELAY,
            max_delay: DEFAULT_RECONNECT_DELAY_MAX,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Delay to wait before attempt `attempt` (one-based).
    ///
    /// Always within `[initial_delay, max_delay]` when
    /// `initial_delay <= max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let factor = 1u32 << exponent;
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Whether attempt `attempt` (one-based) is permitted.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt <= max)
    }
}

/// Connection lifecycle state machine.
///
/// Pure: holds no transport and no clock. The session feeds it local commands
/// and transport reports and acts on the returned transitions.
#[derive(Debug, Clone, Default)]
pub struct Connection {
    state: ConnectionState,
    attempts: u32,
    epoch: Epoch,
}

impl Connection {
    /// Create a machine in [`ConnectionState::Disconnected`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Reconnect attempts since the last successful connect.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Current connection epoch.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Request a connection.
    ///
    /// Valid from `Disconnected` and `Failed`. Returns the epoch the
    /// transport must be opened under.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::AlreadyActive` if connecting, connected or
    ///   reconnecting. Callers treat this as a no-op.
    pub fn connect(&mut self) -> Result<Epoch, ConnectionError> {
        match self.state {
            ConnectionState::Disconnected | ConnectionState::Failed => {
                self.state = ConnectionState::Connecting;
                self.attempts = 0;
                self.epoch = self.epoch.next();
                Ok(self.epoch)
            },
            state => Err(ConnectionError::AlreadyActive(state)),
        }
    }

    /// Tear down the connection. Valid from any state and idempotent.
    ///
    /// Returns `true` if the state changed (the transport must be closed).
    pub fn disconnect(&mut self) -> bool {
        self.attempts = 0;
        if self.state == ConnectionState::Disconnected {
            return false;
        }
        self.state = ConnectionState::Disconnected;
        self.epoch = self.epoch.next();
        true
    }

    /// Apply a transport-reported event.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::InvalidTransition` if the event is not valid in the
    ///   current state. State is left untouched.
    pub fn handle(&mut self, event: LifecycleEvent) -> Result<Transition, ConnectionError> {
        use ConnectionState::{Connected, Connecting, Failed, Reconnecting};

        let from = self.state;
        let to = match (from, event) {
            (Connecting | Reconnecting, LifecycleEvent::Acknowledged) => {
                self.attempts = 0;
                Connected
            },

            (Connected, LifecycleEvent::Lost) => Reconnecting,

            // Failed retries report loss again; initial connect failures are
            // retried by the transport without leaving Connecting.
            (Connecting | Reconnecting, LifecycleEvent::Lost) => from,

            // An attempt implies loss even if the loss report was not seen
            (Connected | Reconnecting, LifecycleEvent::Attempt(_)) => {
                self.attempts = self.attempts.saturating_add(1);
                Reconnecting
            },

            (Connecting, LifecycleEvent::Attempt(_)) => {
                self.attempts = self.attempts.saturating_add(1);
                Connecting
            },

            (Connecting | Reconnecting, LifecycleEvent::GaveUp) => Failed,

            (state, event) => return Err(ConnectionError::InvalidTransition { state, event }),
        };

        self.state = to;
        Ok(Transition { from, to })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn connected() -> Connection {
        let mut conn = Connection::new();
        conn.connect().unwrap();
        conn.handle(LifecycleEvent::Acknowledged).unwrap();
        conn
    }

    #[test]
    fn connect_from_disconnected() {
        let mut conn = Connection::new();
        let epoch = conn.connect().unwrap();

        assert_eq!(conn.state(), ConnectionState::Connecting);
        assert_eq!(epoch, Epoch::new(1));
    }

    #[test]
    fn connect_while_active_is_rejected() {
        let mut conn = connected();
        assert_eq!(conn.connect(), Err(ConnectionError::AlreadyActive(ConnectionState::Connected)));
        assert_eq!(conn.state(), ConnectionState::Connected);
    }

    #[test]
    fn ack_while_disconnected_is_rejected() {
        let mut conn = Connection::new();
        let err = conn.handle(LifecycleEvent::Acknowledged).unwrap_err();

        assert!(err.is_stale());
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn reconnect_cycle_resets_attempts() {
        let mut conn = connected();

        conn.handle(LifecycleEvent::Lost).unwrap();
        conn.handle(LifecycleEvent::Attempt(1)).unwrap();
        conn.handle(LifecycleEvent::Attempt(2)).unwrap();
        assert_eq!(conn.attempts(), 2);
        assert_eq!(conn.state(), ConnectionState::Reconnecting);

        conn.handle(LifecycleEvent::Acknowledged).unwrap();
        assert_eq!(conn.state(), ConnectionState::Connected);
        assert_eq!(conn.attempts(), 0);
    }

    #[test]
    fn gave_up_is_terminal_until_connect() {
        let mut conn = connected();
        conn.handle(LifecycleEvent::Lost).unwrap();
        conn.handle(LifecycleEvent::GaveUp).unwrap();
        assert_eq!(conn.state(), ConnectionState::Failed);

        assert!(conn.handle(LifecycleEvent::Acknowledged).is_err());
        assert!(conn.handle(LifecycleEvent::Attempt(3)).is_err());
        assert_eq!(conn.state(), ConnectionState::Failed);

        conn.connect().unwrap();
        assert_eq!(conn.state(), ConnectionState::Connecting);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut conn = connected();
        let epoch = conn.epoch();

        assert!(conn.disconnect());
        assert_eq!(conn.epoch(), epoch.next());

        assert!(!conn.disconnect());
        assert_eq!(conn.epoch(), epoch.next());
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn policy_delays_are_bounded() {
        let policy = ReconnectPolicy::default();

        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(5000));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_millis(5000));
    }

    #[test]
    fn unbounded_policy_always_allows() {
        let policy = ReconnectPolicy::default();
        assert!(policy.allows(u32::MAX));

        let bounded = ReconnectPolicy { max_attempts: Some(3), ..ReconnectPolicy::default() };
        assert!(bounded.allows(3));
        assert!(!bounded.allows(4));
    }
}
