//! Property-based tests for the core state machines.
//!
//! These check behavioral properties under arbitrary input sequences:
//! - Message log keeps arrival order and forgets everything on clear
//! - A keystroke burst produces exactly one start and one stop
//! - Presence replacement is idempotent
//! - The connection machine never skips `connecting` and never leaves `failed`
//!   without a local connect

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use relaychat_core::{
    Connection, ConnectionState, LifecycleEvent, MessageLog, Presence, TypingIndicator,
    TypingSignal,
};
use relaychat_proto::{ChatMessage, Message, MessageId, User};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

fn chat(id: u64, secs: i64) -> Message {
    Message::Chat(ChatMessage {
        id: MessageId::Number(id),
        sender: "alice".into(),
        sender_id: "s1".into(),
        message: format!("message {id}"),
        timestamp: at(secs),
        is_private: false,
    })
}

/// Messages with arbitrary (often out-of-order or duplicate) ids and
/// timestamps.
fn messages_strategy() -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec((0u64..20, -1_000i64..1_000), 0..40)
        .prop_map(|raw| raw.into_iter().map(|(id, secs)| chat(id, secs)).collect())
}

#[derive(Debug, Clone)]
enum Input {
    Connect,
    Disconnect,
    Event(LifecycleEvent),
}

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        1 => Just(Input::Connect),
        1 => Just(Input::Disconnect),
        2 => Just(Input::Event(LifecycleEvent::Acknowledged)),
        2 => Just(Input::Event(LifecycleEvent::Lost)),
        2 => (1u32..10).prop_map(|n| Input::Event(LifecycleEvent::Attempt(n))),
        1 => Just(Input::Event(LifecycleEvent::GaveUp)),
    ]
}

proptest! {
    #[test]
    fn prop_log_preserves_arrival_order(messages in messages_strategy()) {
        let mut log = MessageLog::new();
        for message in messages.clone() {
            log.append(message);
        }

        prop_assert_eq!(log.entries(), messages.as_slice());
    }

    #[test]
    fn prop_clear_leaves_no_residue(
        before in messages_strategy(),
        after in messages_strategy(),
    ) {
        let mut log = MessageLog::new();
        for message in before {
            log.append(message);
        }

        log.clear();
        for message in after.clone() {
            log.append(message);
        }

        prop_assert_eq!(log.entries(), after.as_slice());
    }

    #[test]
    fn prop_keystroke_burst_emits_one_start_one_stop(
        gaps in prop::collection::vec(0u64..1000, 1..50),
    ) {
        let debounce = Duration::from_millis(1000);
        let mut typing: TypingIndicator<Duration> = TypingIndicator::new(debounce);
        let mut now = Duration::ZERO;
        let mut signals = Vec::new();

        // Every gap is inside the debounce window, interleaved with ticks
        for gap in gaps {
            now += Duration::from_millis(gap);
            signals.extend(typing.tick(now));
            signals.extend(typing.keystroke(now));
        }

        for step in 1..=20 {
            signals.extend(typing.tick(now + Duration::from_millis(step * 100)));
        }

        prop_assert_eq!(signals, vec![TypingSignal::Start, TypingSignal::Stop]);
    }

    #[test]
    fn prop_presence_replace_is_idempotent(
        raw in prop::collection::vec((0u64..50, "[a-z]{1,8}"), 0..20),
    ) {
        let users: Vec<User> = raw.into_iter().map(|(id, name)| User::new(id, name)).collect();

        let mut once = Presence::new();
        once.replace_all(users.clone());

        let mut twice = Presence::new();
        twice.replace_all(users.clone());
        let changed = twice.replace_all(users);

        prop_assert!(!changed);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_connection_transitions_are_valid(
        inputs in prop::collection::vec(input_strategy(), 0..60),
    ) {
        let mut conn = Connection::new();
        let mut last_epoch = conn.epoch();

        for input in inputs {
            let before = conn.state();
            let is_connect = matches!(input, Input::Connect);

            match input {
                Input::Connect => {
                    let _ = conn.connect();
                },
                Input::Disconnect => {
                    conn.disconnect();
                },
                Input::Event(event) => {
                    if conn.handle(event).is_err() {
                        prop_assert_eq!(conn.state(), before);
                    }
                },
            }

            let after = conn.state();

            prop_assert!(
                !(before == ConnectionState::Disconnected && after == ConnectionState::Connected),
                "skipped connecting"
            );
            if before == ConnectionState::Failed && after != ConnectionState::Failed {
                prop_assert!(
                    is_connect || after == ConnectionState::Disconnected,
                    "left failed without a local command"
                );
            }
            if after == ConnectionState::Connected {
                prop_assert_eq!(conn.attempts(), 0);
            }

            prop_assert!(conn.epoch() >= last_epoch);
            last_epoch = conn.epoch();
        }
    }
}
