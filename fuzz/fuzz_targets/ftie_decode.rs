//! Fuzz target for FtIe::parse
//!
//! Exercises the sub-element cursor with arbitrary bytes: overrunning
//! lengths, zero-length padding, and truncated fixed parts must all return
//! errors, never panic or loop.

#![no_main]

use libfuzzer_sys::fuzz_target;
use roamkey_proto::{FtIe, mic_zeroed};

fuzz_target!(|data: &[u8]| {
    let _ = FtIe::parse(data);
    let _ = mic_zeroed(data);
});
