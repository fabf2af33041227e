//! Fuzz target for FtActionFrame::parse
//!
//! Arbitrary byte sequences must never panic the frame parser: element
//! scans are length-checked and malformed input returns an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use roamkey_proto::FtActionFrame;

fuzz_target!(|data: &[u8]| {
    // Round-trip any frame that parses; re-serialization must not panic
    if let Ok(frame) = FtActionFrame::parse(data) {
        let _ = frame.to_bytes();
    }
});
