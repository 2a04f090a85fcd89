//! Fuzz target for the session state machine
//!
//! Drives a `Session` on virtual time with arbitrary interleavings of local
//! commands, server pushes (well-formed or not) and stale deliveries, checking
//! the standard invariants after every step.
//!
//! The fuzzer should NEVER panic.

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use relaychat_client::{Environment, Epoch, Identity, Session, SessionConfig, SessionEvent};
use relaychat_harness::{InvariantRegistry, SessionSnapshot, SimEnv, SystemSnapshot};
use relaychat_proto::{Frame, ServerEventName};

const ROOMS: [&str; 3] = ["general", "random", "help"];

#[derive(Debug, Arbitrary)]
enum Op {
    Connect(u8),
    Disconnect,
    Deliver { event: u8, payload: String },
    Stale { event: u8, payload: String },
    Send(String),
    Typing(bool),
    Join(u8),
    LoadOlder,
    Advance(u16),
}

fn frame(event: u8, payload: &str) -> Frame {
    let name = ServerEventName::ALL[usize::from(event) % ServerEventName::ALL.len()];
    let data = serde_json::from_str(payload).unwrap_or(serde_json::Value::String(payload.to_string()));
    Frame { event: name.as_str().to_string(), data }
}

fuzz_target!(|ops: Vec<Op>| {
    let env = SimEnv::new();
    let mut session = Session::new(env.clone(), SessionConfig::default());
    let registry = InvariantRegistry::standard();
    let mut history = Vec::new();

    for op in ops {
        match op {
            Op::Connect(room) => {
                session.connect(Identity::new("fuzz", ROOMS[usize::from(room) % ROOMS.len()]));
            },
            Op::Disconnect => {
                session.disconnect();
            },
            Op::Deliver { event, payload } => {
                let epoch = session.epoch();
                session.handle(SessionEvent::Delivery { epoch, frame: frame(event, &payload) });
            },
            Op::Stale { event, payload } => {
                let epoch = Epoch::new(session.epoch().value().wrapping_sub(1));
                let actions =
                    session.handle(SessionEvent::Delivery { epoch, frame: frame(event, &payload) });
                assert!(actions.is_empty());
            },
            Op::Send(text) => {
                session.send_message(&text);
            },
            Op::Typing(is_typing) => {
                session.set_typing(is_typing, env.now());
            },
            Op::Join(room) => {
                session.join_room(ROOMS[usize::from(room) % ROOMS.len()], env.now());
            },
            Op::LoadOlder => {
                session.load_older();
            },
            Op::Advance(ms) => {
                env.advance(Duration::from_millis(u64::from(ms)));
                session.handle(SessionEvent::Tick { now: env.now() });
            },
        }

        let snapshot = SessionSnapshot::capture(&session).with_history(history.clone());
        history.push(session.epoch());
        registry.assert_all(&SystemSnapshot::single(snapshot), "fuzz step");
    }
});
