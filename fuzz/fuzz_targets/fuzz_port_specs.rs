//! Fuzz target for port list parsing.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_port_specs
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = flowcheck_sources::fuzz::parse_port_specs(text);
    }
});
