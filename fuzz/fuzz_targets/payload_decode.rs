//! Fuzz target for ServerEvent::from_frame
//!
//! Pairs arbitrary JSON payloads with every server event name to find:
//! - Type confusion (wrong payload shape for the event)
//! - Oversized strings or collections
//! - Deeply nested structures
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use relaychat_proto::{Frame, ServerEvent, ServerEventName};

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    for name in ServerEventName::ALL {
        let frame = Frame { event: name.as_str().to_string(), data: payload.clone() };

        if let Ok(event) = ServerEvent::from_frame(&frame) {
            assert_eq!(event.name(), name);
        }
    }
});
