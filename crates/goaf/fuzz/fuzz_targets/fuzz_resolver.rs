//! Fuzz target for the encoding resolver and loader.
//!
//! This fuzzer tests that table resolution:
//! 1. Never panics on malformed bytes in any encoding
//! 2. Produces as many records as it reports rows

#![no_main]

use goaf::{EncodingResolver, TableLoader, TableRegistry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    if let Ok(parsed) = EncodingResolver::new().resolve(data) {
        let table = TableRegistry::standard().tables()[0].clone();
        if let Ok(records) = TableLoader::new().load(&table, data) {
            assert_eq!(records.len(), parsed.row_count());
        }
    }
});
