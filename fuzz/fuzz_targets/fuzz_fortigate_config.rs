//! Fuzz target for the FortiGate configuration parser.
//!
//! The parser may reject input with a `SourceError` but must never panic.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_fortigate_config
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let _ = flowcheck_sources::fuzz::parse_fortigate_config(&text);
});
