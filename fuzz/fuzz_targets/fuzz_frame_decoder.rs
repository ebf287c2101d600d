//! Fuzz the channel frame decoder.
//!
//! The decoder sees raw mesh text straight off the air, so it must never
//! panic on arbitrary input. Decoded frames must also re-encode without
//! panicking (the relay path re-encodes every accepted frame).

#![no_main]

use libfuzzer_sys::fuzz_target;
use lighthouse::protocol::Frame;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Some(frame) = Frame::decode(text) {
        let _ = frame.encode();
    }
});
