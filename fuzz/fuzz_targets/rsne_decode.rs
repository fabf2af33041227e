//! Fuzz target for Rsne::parse
//!
//! Suite counts and PMKID counts come straight off the wire; absurd values
//! must fail cleanly without large allocations or over-reads.

#![no_main]

use libfuzzer_sys::fuzz_target;
use roamkey_proto::Rsne;

fuzz_target!(|data: &[u8]| {
    let _ = Rsne::parse(data);
});
