//! Fuzz target for parsing plus supercategory filtering.
//!
//! Any manifest that parses must either index cleanly or fail with an error;
//! an accepted index never holds more entries than the manifest has records.
//!
//! Run with:
//!   cargo +nightly fuzz run manifest_index

#![no_main]

use inatindex::diagnostics::NullSink;
use inatindex::index::{index_manifest, SupercategoryFilter};
use inatindex::manifest::io_json::from_manifest_slice;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(manifest) = from_manifest_slice(data) else {
        return;
    };

    for filter in [SupercategoryFilter::All, SupercategoryFilter::defaults()] {
        if let Ok(index) = index_manifest(&manifest, &filter, &NullSink) {
            assert!(index.len() <= manifest.annotations.len());
        }
    }
});
