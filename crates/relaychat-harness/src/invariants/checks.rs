//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use relaychat_client::ConnectionState;
use relaychat_proto::ServerEventName;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// Active room must be one of the known rooms.
pub struct ActiveRoomKnown;

impl Invariant for ActiveRoomKnown {
    fn name(&self) -> &'static str {
        "active_room_known"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (i, session) in state.sessions.iter().enumerate() {
            if !session.known_rooms.contains(&session.active_room) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "session {i}: active room {} not in {:?}",
                        session.active_room, session.known_rooms
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A pending join never names the room that is already active.
pub struct PendingJoinNotActive;

impl Invariant for PendingJoinNotActive {
    fn name(&self) -> &'static str {
        "pending_join_not_active"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (i, session) in state.sessions.iter().enumerate() {
            if session.pending_join.as_deref() == Some(session.active_room.as_str()) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("session {i}: pending join for active room {}", session.active_room),
                });
            }
        }
        Ok(())
    }
}

/// Connection epochs never decrease.
///
/// A decreasing epoch would let deliveries from a superseded socket through.
pub struct EpochMonotonicity;

impl Invariant for EpochMonotonicity {
    fn name(&self) -> &'static str {
        "epoch_monotonicity"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (i, session) in state.sessions.iter().enumerate() {
            let observed = session.epoch_history.iter().chain(std::iter::once(&session.epoch));
            let mut previous = None;
            for epoch in observed {
                if previous.is_some_and(|p| epoch < p) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!("session {i}: epoch decreased to {epoch}"),
                    });
                }
                previous = Some(epoch);
            }
        }
        Ok(())
    }
}

/// The attempt counter is zero whenever the session is connected.
pub struct AttemptsResetWhenConnected;

impl Invariant for AttemptsResetWhenConnected {
    fn name(&self) -> &'static str {
        "attempts_reset_when_connected"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (i, session) in state.sessions.iter().enumerate() {
            if session.state == ConnectionState::Connected && session.attempts != 0 {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("session {i}: connected with {} attempts", session.attempts),
                });
            }
        }
        Ok(())
    }
}

/// Local typing is only ever on while connected.
pub struct NoTypingWhileOffline;

impl Invariant for NoTypingWhileOffline {
    fn name(&self) -> &'static str {
        "no_typing_while_offline"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (i, session) in state.sessions.iter().enumerate() {
            if session.local_typing && session.state != ConnectionState::Connected {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("session {i}: typing while {}", session.state),
                });
            }
        }
        Ok(())
    }
}

/// An attached session holds exactly one binding per server event; a torn
/// down session holds none.
pub struct BindingsMatchAttachment;

impl Invariant for BindingsMatchAttachment {
    fn name(&self) -> &'static str {
        "bindings_match_attachment"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (i, session) in state.sessions.iter().enumerate() {
            let expected = if session.attached { ServerEventName::ALL.len() } else { 0 };
            if session.bindings != expected {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "session {i}: {} bindings, expected {expected} (attached: {})",
                        session.bindings, session.attached
                    ),
                });
            }
        }
        Ok(())
    }
}
