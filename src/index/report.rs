//! Index summary report.
//!
//! Rendered as text through `Display` or serialized as JSON.

use serde::Serialize;
use std::fmt;

/// What a [`FilteredIndex`](super::FilteredIndex) kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    /// One row per kept supercategory, sorted by name.
    pub supercategories: Vec<SupercategoryCount>,
    /// Total number of kept images.
    pub total_images: usize,
}

/// Counts for a single supercategory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SupercategoryCount {
    pub supercategory: String,
    /// Distinct class labels.
    pub classes: usize,
    pub images: usize,
}

impl IndexSummary {
    /// Total distinct classes across all kept supercategories.
    pub fn total_classes(&self) -> usize {
        self.supercategories.iter().map(|row| row.classes).sum()
    }
}

impl fmt::Display for IndexSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.supercategories.is_empty() {
            return writeln!(f, "No images matched the supercategory selection");
        }

        let width = self
            .supercategories
            .iter()
            .map(|row| row.supercategory.len())
            .max()
            .unwrap_or(0)
            .max("Supercategory".len());

        writeln!(
            f,
            "{:<width$}  {:>8}  {:>8}",
            "Supercategory", "Classes", "Images"
        )?;
        for row in &self.supercategories {
            writeln!(
                f,
                "{:<width$}  {:>8}  {:>8}",
                row.supercategory, row.classes, row.images
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{} supercategories, {} classes, {} images in total",
            self.supercategories.len(),
            self.total_classes(),
            self.total_images
        )
    }
}
