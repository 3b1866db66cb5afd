//! Supercategory-filtered annotation index.
//!
//! The index walks a manifest's three parallel arrays in lockstep, checks
//! that each position is internally consistent, and keeps the records whose
//! supercategory passes a [`SupercategoryFilter`]. The result is a
//! [`FilteredIndex`]: parallel lists of file names, class labels and
//! supercategories in manifest order, plus the set of class labels seen in
//! each supercategory.

mod report;

pub use report::{IndexSummary, SupercategoryCount};

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::diagnostics::DiagnosticsSink;
use crate::error::DatasetError;
use crate::manifest::io_json::read_manifest_json;
use crate::manifest::Manifest;

/// Supercategories kept when the caller does not choose any.
///
/// Ten of the fourteen iNaturalist 2018 supercategories: those with at least
/// 100 classes, minus Actinopterygii. Never derived from a manifest.
pub const DEFAULT_SUPERCATEGORIES: [&str; 10] = [
    "Amphibia", "Animalia", "Arachnida", "Aves", "Fungi", "Insecta", "Mammalia", "Mollusca",
    "Plantae", "Reptilia",
];

/// Which supercategories a [`FilteredIndex`] keeps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SupercategoryFilter {
    /// Keep every record.
    All,
    /// Keep only records whose supercategory is in the set.
    Only(BTreeSet<String>),
}

impl SupercategoryFilter {
    /// Builds a filter from any collection of names.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SupercategoryFilter::Only(names.into_iter().map(Into::into).collect())
    }

    /// The [`DEFAULT_SUPERCATEGORIES`] selection.
    pub fn defaults() -> Self {
        Self::only(DEFAULT_SUPERCATEGORIES)
    }

    /// Returns true if records of `supercategory` are kept.
    pub fn accepts(&self, supercategory: &str) -> bool {
        match self {
            SupercategoryFilter::All => true,
            SupercategoryFilter::Only(names) => names.contains(supercategory),
        }
    }
}

impl Default for SupercategoryFilter {
    fn default() -> Self {
        Self::defaults()
    }
}

/// One kept record, borrowed from a [`FilteredIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexEntry<'a> {
    pub file_name: &'a str,
    pub class_label: &'a str,
    pub supercategory: &'a str,
}

/// Records that passed the supercategory filter, in manifest order.
///
/// Immutable once built; rebuild from the manifest to change the selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilteredIndex {
    file_names: Vec<String>,
    targets: Vec<String>,
    supercategory_targets: Vec<String>,
    classes_per_supercategory: BTreeMap<String, BTreeSet<String>>,
}

impl FilteredIndex {
    /// Number of kept records.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Returns the kept record at `position`, if any.
    pub fn entry(&self, position: usize) -> Option<IndexEntry<'_>> {
        Some(IndexEntry {
            file_name: self.file_names.get(position)?.as_str(),
            class_label: self.targets.get(position)?.as_str(),
            supercategory: self.supercategory_targets.get(position)?.as_str(),
        })
    }

    /// Iterates over kept records in manifest order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = IndexEntry<'_>> + '_ {
        (0..self.len()).map(move |i| IndexEntry {
            file_name: self.file_names[i].as_str(),
            class_label: self.targets[i].as_str(),
            supercategory: self.supercategory_targets[i].as_str(),
        })
    }

    /// Image paths relative to the dataset root.
    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }

    /// Class labels, parallel to [`file_names`](Self::file_names).
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Supercategory labels, parallel to [`file_names`](Self::file_names).
    pub fn supercategory_targets(&self) -> &[String] {
        &self.supercategory_targets
    }

    /// Distinct class labels observed in each kept supercategory.
    pub fn classes_per_supercategory(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.classes_per_supercategory
    }

    /// Positions of the kept records grouped by supercategory.
    ///
    /// Handy for splitting the dataset into one task per supercategory.
    pub fn indices_by_supercategory(&self) -> BTreeMap<&str, Vec<usize>> {
        let mut grouped: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (position, supercategory) in self.supercategory_targets.iter().enumerate() {
            grouped
                .entry(supercategory.as_str())
                .or_default()
                .push(position);
        }
        grouped
    }

    /// Summarizes the index (classes per supercategory, image counts).
    pub fn summary(&self) -> IndexSummary {
        let mut images: BTreeMap<&str, usize> = BTreeMap::new();
        for supercategory in &self.supercategory_targets {
            *images.entry(supercategory.as_str()).or_default() += 1;
        }

        let supercategories = self
            .classes_per_supercategory
            .iter()
            .map(|(name, classes)| SupercategoryCount {
                supercategory: name.clone(),
                classes: classes.len(),
                images: images.get(name.as_str()).copied().unwrap_or(0),
            })
            .collect();

        IndexSummary {
            supercategories,
            total_images: self.len(),
        }
    }

    fn push(&mut self, file_name: &str, class_label: &str, supercategory: &str) {
        self.classes_per_supercategory
            .entry(supercategory.to_string())
            .or_default()
            .insert(class_label.to_string());

        self.file_names.push(file_name.to_string());
        self.targets.push(class_label.to_string());
        self.supercategory_targets.push(supercategory.to_string());
    }
}

/// Reads the manifest at `path` and indexes it.
///
/// # Errors
/// Propagates every error of [`read_manifest_json`] and [`index_manifest`].
pub fn build_index(
    path: &Path,
    filter: &SupercategoryFilter,
    sink: &dyn DiagnosticsSink,
) -> Result<FilteredIndex, DatasetError> {
    sink.info(&format!("Loading annotations from: {}", path.display()));
    let manifest = read_manifest_json(path)?;
    index_manifest(&manifest, filter, sink)
}

/// Indexes an in-memory manifest.
///
/// Positions are trusted to line up across the three arrays, and that trust
/// is checked: a length mismatch, or an annotation whose `image_id` or
/// `category_id` differs from the image or category at the same position,
/// fails with [`DatasetError::ManifestConsistency`].
pub fn index_manifest(
    manifest: &Manifest,
    filter: &SupercategoryFilter,
    sink: &dyn DiagnosticsSink,
) -> Result<FilteredIndex, DatasetError> {
    if manifest.aligned_len().is_none() {
        return Err(DatasetError::consistency(format!(
            "array lengths differ: annotations={}, images={}, categories={}",
            manifest.annotations.len(),
            manifest.images.len(),
            manifest.categories.len()
        )));
    }

    let mut index = FilteredIndex::default();
    let rows = manifest
        .annotations
        .iter()
        .zip(&manifest.images)
        .zip(&manifest.categories);

    for (position, ((ann, img), cat)) in rows.enumerate() {
        if ann.image_id != img.id {
            return Err(DatasetError::consistency(format!(
                "position {position}: annotation {} references image {} but the image record there has id {}",
                ann.id, ann.image_id, img.id
            )));
        }
        if ann.category_id != cat.id {
            return Err(DatasetError::consistency(format!(
                "position {position}: annotation {} references category {} but the category record there has id {}",
                ann.id, ann.category_id, cat.id
            )));
        }

        if filter.accepts(&cat.supercategory) {
            index.push(&img.file_name, &cat.class_label, &cat.supercategory);
        } else if sink.debug_enabled() {
            sink.debug(&format!(
                "skipping {} (supercategory {})",
                img.file_name, cat.supercategory
            ));
        }
    }

    let summary = index.summary();
    sink.info("Classes per supercategory:");
    for row in &summary.supercategories {
        sink.info(&format!("  {}: {}", row.supercategory, row.classes));
    }
    sink.info(&format!("Images in total: {}", summary.total_images));

    Ok(index)
}
