//! Typing indicator aggregation.
//!
//! Two independent halves:
//!
//! - **Remote**: usernames the server reports as typing. Replaced wholesale by
//!   every `typing_users` snapshot and cleared on room switch. Never expired
//!   locally.
//! - **Local**: debounced intent of the local user. Emits one
//!   [`TypingSignal::Start`] on the first keystroke after idle and one
//!   [`TypingSignal::Stop`] once no keystroke arrived for the debounce window.
//!
//! # Local State Machine
//!
//! ```text
//!            keystroke / Start
//! ┌──────┐─────────────────────>┌────────────────────┐
//! │ Idle │                      │ Typing { deadline }│──┐ keystroke
//! └──────┘<─────────────────────└────────────────────┘<─┘ (deadline moved)
//!            tick past deadline / Stop
//!            stop() / Stop
//!            cancel() (silent)
//! ```
//!
//! The pending timeout is a single deadline stored in the state. Moving it on
//! a keystroke replaces the old one, so only one expiry can ever fire per idle
//! period.

use std::{ops::Add, time::Duration};

/// Default inactivity window before local typing is considered stopped.
pub const DEFAULT_TYPING_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Local typing notification to send to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingSignal {
    /// `typing(true)`
    Start,
    /// `typing(false)`
    Stop,
}

impl TypingSignal {
    /// Wire value of the signal.
    pub fn is_typing(self) -> bool {
        self == Self::Start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocalTyping<I> {
    Idle,
    Typing { deadline: I },
}

/// Remote typing snapshot plus local debounced typing intent.
#[derive(Debug, Clone)]
pub struct TypingIndicator<I> {
    debounce: Duration,
    local: LocalTyping<I>,
    remote: Vec<String>,
}

impl<I> TypingIndicator<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create an idle indicator with the given debounce window.
    pub fn new(debounce: Duration) -> Self {
        Self { debounce, local: LocalTyping::Idle, remote: Vec::new() }
    }

    /// Debounce window.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Record a keystroke at `now`.
    ///
    /// Returns `Start` only on the transition out of idle; while already
    /// typing the deadline is pushed back and nothing is emitted.
    pub fn keystroke(&mut self, now: I) -> Option<TypingSignal> {
        let deadline = now + self.debounce;
        match self.local {
            LocalTyping::Idle => {
                self.local = LocalTyping::Typing { deadline };
                Some(TypingSignal::Start)
            },
            LocalTyping::Typing { .. } => {
                self.local = LocalTyping::Typing { deadline };
                None
            },
        }
    }

    /// Advance time. Returns `Stop` if the debounce window elapsed.
    pub fn tick(&mut self, now: I) -> Option<TypingSignal> {
        match self.local {
            LocalTyping::Typing { deadline } if now >= deadline => {
                self.local = LocalTyping::Idle;
                Some(TypingSignal::Stop)
            },
            _ => None,
        }
    }

    /// Stop typing immediately (message submitted). `Stop` if was typing.
    pub fn stop(&mut self) -> Option<TypingSignal> {
        match self.local {
            LocalTyping::Typing { .. } => {
                self.local = LocalTyping::Idle;
                Some(TypingSignal::Stop)
            },
            LocalTyping::Idle => None,
        }
    }

    /// Drop local typing state without notifying anyone.
    ///
    /// Used when the connection that would carry the signal is gone.
    /// Returns `true` if a pending deadline was discarded.
    pub fn cancel(&mut self) -> bool {
        let was_typing = self.is_typing();
        self.local = LocalTyping::Idle;
        was_typing
    }

    /// True while the local user is considered typing.
    pub fn is_typing(&self) -> bool {
        matches!(self.local, LocalTyping::Typing { .. })
    }

    /// Pending debounce deadline, if typing.
    pub fn deadline(&self) -> Option<I> {
        match self.local {
            LocalTyping::Typing { deadline } => Some(deadline),
            LocalTyping::Idle => None,
        }
    }

    /// Replace the remote snapshot. Duplicate names are collapsed, keeping the
    /// first occurrence.
    pub fn replace_remote(&mut self, users: Vec<String>) {
        let mut deduped: Vec<String> = Vec::with_capacity(users.len());
        for user in users {
            if !deduped.contains(&user) {
                deduped.push(user);
            }
        }
        self.remote = deduped;
    }

    /// Empty the remote snapshot.
    pub fn clear_remote(&mut self) {
        self.remote.clear();
    }

    /// Remote usernames currently typing, in snapshot order.
    pub fn remote(&self) -> &[String] {
        &self.remote
    }

    /// Human-readable line such as `"alice, bob are typing..."`.
    pub fn summary(&self) -> Option<String> {
        match self.remote.as_slice() {
            [] => None,
            [one] => Some(format!("{one} is typing...")),
            many => Some(format!("{} are typing...", many.join(", "))),
        }
    }
}

impl<I> Default for TypingIndicator<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Duration doubles as a monotonic instant in these tests
    type Indicator = TypingIndicator<Duration>;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_emits_one_start_and_one_stop() {
        let mut typing = Indicator::default();

        assert_eq!(typing.keystroke(ms(0)), Some(TypingSignal::Start));
        assert_eq!(typing.keystroke(ms(300)), None);
        assert_eq!(typing.keystroke(ms(900)), None);

        assert_eq!(typing.tick(ms(1500)), None);
        assert_eq!(typing.tick(ms(1900)), Some(TypingSignal::Stop));
        assert_eq!(typing.tick(ms(5000)), None);
    }

    #[test]
    fn typing_again_after_idle_restarts() {
        let mut typing = Indicator::default();
        typing.keystroke(ms(0));
        typing.tick(ms(1000));

        assert_eq!(typing.keystroke(ms(2000)), Some(TypingSignal::Start));
        assert_eq!(typing.deadline(), Some(ms(3000)));
    }

    #[test]
    fn explicit_stop_prevents_later_expiry() {
        let mut typing = Indicator::default();
        typing.keystroke(ms(0));

        assert_eq!(typing.stop(), Some(TypingSignal::Stop));
        assert_eq!(typing.stop(), None);
        assert_eq!(typing.tick(ms(10_000)), None);
    }

    #[test]
    fn cancel_is_silent() {
        let mut typing = Indicator::default();
        typing.keystroke(ms(0));

        assert!(typing.cancel());
        assert!(!typing.is_typing());
        assert_eq!(typing.tick(ms(10_000)), None);
    }

    #[test]
    fn remote_snapshot_replaces_and_dedups() {
        let mut typing = Indicator::default();
        typing.replace_remote(vec!["carol".into(), "dave".into()]);
        typing.replace_remote(vec!["erin".into(), "erin".into()]);

        assert_eq!(typing.remote(), ["erin".to_string()]);
    }

    #[test]
    fn remote_is_not_expired_by_time() {
        let mut typing = Indicator::default();
        typing.replace_remote(vec!["carol".into()]);
        typing.tick(ms(60_000));

        assert_eq!(typing.remote().len(), 1);
    }

    #[test]
    fn summary_text() {
        let mut typing = Indicator::default();
        assert_eq!(typing.summary(), None);

        typing.replace_remote(vec!["alice".into()]);
        assert_eq!(typing.summary().as_deref(), Some("alice is typing..."));

        typing.replace_remote(vec!["alice".into(), "bob".into()]);
        assert_eq!(typing.summary().as_deref(), Some("alice, bob are typing..."));
    }
}
