//! Fuzz target for Frame::decode
//!
//! Feeds arbitrary text to the wire decoder and, when a frame comes out, to
//! both event decoders. Looks for:
//! - Parser panics on malformed JSON
//! - Scalar/object payload confusion that slips past validation
//! - Timestamp parsing edge cases
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use relaychat_proto::{ClientCommand, Frame, ServerEvent};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(frame) = Frame::decode(text) {
        let _ = ServerEvent::from_frame(&frame);
        let _ = ClientCommand::from_frame(&frame);

        // Whatever decodes must encode again
        assert!(frame.encode().is_ok());
    }
});
