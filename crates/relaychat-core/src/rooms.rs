//! Room switch coordinator.
//!
//! A switch is a two-step protocol: [`RoomSwitchCoordinator::request`] records
//! a pending join (the caller sends `join_room`), and
//! [`RoomSwitchCoordinator::confirm`] applies the server's `room_joined`.
//! Nothing changes locally between the two. A pending join that is never
//! confirmed can be abandoned with [`RoomSwitchCoordinator::expire`], leaving
//! the previous room active.

use std::{ops::Add, time::Duration};

use crate::{error::RoomError, message_log::MessageLog, typing::TypingIndicator};

/// Rooms every client knows about before the server confirms any join.
pub const DEFAULT_ROOMS: [&str; 3] = ["general", "random", "help"];

/// Room entered on first connect.
pub const DEFAULT_ROOM: &str = "general";

/// A join request awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingJoin<I> {
    /// Requested room.
    pub room: String,
    /// When the request was sent.
    pub requested_at: I,
}

/// Outcome of a confirmed switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSwitch {
    /// Room now active.
    pub room: String,
    /// Room was added to the known-rooms cache.
    pub newly_known: bool,
    /// Confirmation matched the pending request.
    pub was_pending: bool,
}

/// Tracks the active room, the known-rooms cache and any pending join.
#[derive(Debug, Clone)]
pub struct RoomSwitchCoordinator<I> {
    known: Vec<String>,
    active: String,
    pending: Option<PendingJoin<I>>,
    confirmed: bool,
}

impl<I> RoomSwitchCoordinator<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create a coordinator seeded with `known` rooms and `active` as the
    /// active room. The active room is added to the cache if missing.
    pub fn new<S: AsRef<str>>(known: &[S], active: impl Into<String>) -> Self {
        let active = active.into();
        let mut rooms: Vec<String> = Vec::with_capacity(known.len() + 1);
        for room in known {
            let room = room.as_ref().to_string();
            if !rooms.contains(&room) {
                rooms.push(room);
            }
        }
        if !rooms.contains(&active) {
            rooms.push(active.clone());
        }

        Self { known: rooms, active, pending: None, confirmed: false }
    }

    /// Active room.
    pub fn active(&self) -> &str {
        &self.active
    }

    /// Known rooms, in discovery order.
    pub fn known(&self) -> &[String] {
        &self.known
    }

    /// Join awaiting confirmation.
    pub fn pending(&self) -> Option<&PendingJoin<I>> {
        self.pending.as_ref()
    }

    /// Record a join request. Returns the normalized room name to send.
    ///
    /// A newer request replaces an older pending one.
    ///
    /// # Errors
    ///
    /// - `RoomError::EmptyName` if the name is blank
    /// - `RoomError::AlreadyActive` if the room is already active
    pub fn request(&mut self, name: &str, now: I) -> Result<String, RoomError> {
        let room = name.trim();
        if room.is_empty() {
            return Err(RoomError::EmptyName);
        }
        if room == self.active {
            return Err(RoomError::AlreadyActive(room.to_string()));
        }

        self.pending = Some(PendingJoin { room: room.to_string(), requested_at: now });
        Ok(room.to_string())
    }

    /// Apply a server join confirmation.
    ///
    /// Clears the message log and the remote typing set, records the room as
    /// active and extends the known-rooms cache.
    pub fn confirm(
        &mut self,
        room: String,
        log: &mut MessageLog,
        typing: &mut TypingIndicator<I>,
    ) -> RoomSwitch {
        log.clear();
        typing.clear_remote();

        let was_pending = self.pending.as_ref().is_some_and(|p| p.room == room);
        if was_pending {
            self.pending = None;
        }

        let newly_known = !self.known.contains(&room);
        if newly_known {
            self.known.push(room.clone());
        }

        self.active.clone_from(&room);
        self.confirmed = true;
        RoomSwitch { room, newly_known, was_pending }
    }

    /// Pick the room to enter on first connect.
    ///
    /// Only allowed before the server has confirmed any room; afterwards the
    /// active room changes through [`Self::confirm`] alone. An unknown room
    /// is seeded into the known-rooms cache like the defaults, so the active
    /// room is always known. Returns `true` if the active room was replaced.
    pub fn select_initial(&mut self, name: &str) -> bool {
        let room = name.trim();
        if self.confirmed || room.is_empty() || room == self.active {
            return false;
        }

        if !self.known.iter().any(|known| known == room) {
            self.known.push(room.to_string());
        }
        self.active = room.to_string();
        true
    }

    /// Abandon the pending join if it is older than `timeout`.
    pub fn expire(&mut self, now: I, timeout: Duration) -> Option<PendingJoin<I>> {
        let expired = self.pending.as_ref().is_some_and(|p| now >= p.requested_at + timeout);
        if expired { self.pending.take() } else { None }
    }

    /// Forget the pending join without a confirmation.
    pub fn abandon(&mut self) -> Option<PendingJoin<I>> {
        self.pending.take()
    }
}

impl<I> Default for RoomSwitchCoordinator<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    fn default() -> Self {
        Self::new(&DEFAULT_ROOMS, DEFAULT_ROOM)
    }
}
