#![allow(dead_code)]

use inatindex::manifest::{AnnotationRecord, CategoryRecord, ImageRecord, Manifest};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const SUPERCATEGORIES: [&str; 6] = [
    "Insecta",
    "Fungi",
    "Aves",
    "Plantae",
    "Actinopterygii",
    "Protozoa",
];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// (class, supercategory) for one aligned position.
pub fn arb_labelled() -> impl Strategy<Value = (String, String)> {
    (0usize..SUPERCATEGORIES.len(), 0u8..5).prop_map(|(sup, class)| {
        let supercategory = SUPERCATEGORIES[sup].to_string();
        (format!("{supercategory}-{class}"), supercategory)
    })
}

/// A positionally consistent manifest with up to `max_rows` records.
pub fn arb_manifest(max_rows: usize) -> impl Strategy<Value = Manifest> {
    proptest::collection::vec(arb_labelled(), 0..=max_rows).prop_map(|rows| {
        let mut manifest = Manifest::default();
        for (i, (class, supercategory)) in rows.into_iter().enumerate() {
            let id = i as i64 + 1;
            manifest
                .annotations
                .push(AnnotationRecord::new(id, id * 10, id * 100));
            manifest
                .images
                .push(ImageRecord::new(id * 10, format!("{supercategory}/{id}.jpg")));
            manifest
                .categories
                .push(CategoryRecord::new(id * 100, class, supercategory));
        }
        manifest
    })
}

/// Any subset of the known supercategories, possibly empty.
pub fn arb_selection() -> impl Strategy<Value = Vec<String>> {
    proptest::sample::subsequence(SUPERCATEGORIES.to_vec(), 0..=SUPERCATEGORIES.len())
        .prop_map(|names| names.into_iter().map(str::to_string).collect())
}
