//! Observable session state snapshots for invariant checking.
//!
//! Invariants operate on snapshots rather than live state so a check sees one
//! consistent view.

use relaychat_client::{ConnectionState, Environment, Epoch, Session};

/// Snapshot of one session's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Connection lifecycle state.
    pub state: ConnectionState,
    /// Reconnect attempts since the last successful connect.
    pub attempts: u32,
    /// Current connection epoch.
    pub epoch: Epoch,
    /// Active room.
    pub active_room: String,
    /// Known rooms.
    pub known_rooms: Vec<String>,
    /// Room awaiting confirmation.
    pub pending_join: Option<String>,
    /// Number of messages in the log.
    pub messages: usize,
    /// Remote users typing.
    pub remote_typing: Vec<String>,
    /// Local user considered typing.
    pub local_typing: bool,
    /// Session has not been torn down.
    pub attached: bool,
    /// Live handler bindings.
    pub bindings: usize,
    /// Epochs observed at earlier snapshots, oldest first.
    pub epoch_history: Vec<Epoch>,
}

impl SessionSnapshot {
    /// Capture the current state of `session`.
    pub fn capture<E: Environment>(session: &Session<E>) -> Self {
        Self {
            state: session.connection_state(),
            attempts: session.reconnection_attempts(),
            epoch: session.epoch(),
            active_room: session.active_room().to_string(),
            known_rooms: session.known_rooms().to_vec(),
            pending_join: session.pending_join().map(str::to_string),
            messages: session.messages().len(),
            remote_typing: session.typing_users().to_vec(),
            local_typing: session.is_typing(),
            attached: session.is_attached(),
            bindings: session.binding_count(),
            epoch_history: Vec::new(),
        }
    }

    /// Attach the epochs observed before this snapshot.
    #[must_use]
    pub fn with_history(mut self, history: Vec<Epoch>) -> Self {
        self.epoch_history = history;
        self
    }
}

/// Snapshot of every session under test.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-session snapshots.
    pub sessions: Vec<SessionSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no sessions).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single session.
    pub fn single(session: SessionSnapshot) -> Self {
        Self { sessions: vec![session] }
    }
}
