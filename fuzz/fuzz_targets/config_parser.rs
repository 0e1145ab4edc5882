//! Fuzz target for the sieve config parser.
//!
//! Feeds arbitrary strings to `SieveConfig::from_str`, which expands
//! environment references, parses TOML and validates the UTC offset.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_config_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sieve_query::config::SieveConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Errors are fine, panics are not
        if let Ok(config) = SieveConfig::from_str(input) {
            assert!(config.calendar().is_ok(), "accepted config with bad offset");
        }
    }
});
