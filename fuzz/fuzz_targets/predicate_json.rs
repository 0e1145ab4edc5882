//! Fuzz target for deserializing predicate trees from JSON.
//!
//! Caller-supplied trees arrive as JSON; whatever deserializes must optimize
//! without panicking.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_predicate_json
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sieve_query::Predicate;

fuzz_target!(|data: &[u8]| {
    if let Ok(tree) = serde_json::from_slice::<Predicate>(data) {
        let _ = tree.to_string();
        let _ = tree.optimize();
    }
});
