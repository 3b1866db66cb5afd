//! Fuzz target for manifest JSON parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run manifest_json_parse

#![no_main]

use inatindex::manifest::io_json::from_manifest_slice;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Real manifests are large, but 10MB is plenty to exercise the parser.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_manifest_slice(data);
});
