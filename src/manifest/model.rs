//! Record types of a split manifest.
//!
//! A manifest holds three parallel arrays. Position `i` of `annotations`,
//! `images` and `categories` describes the same labelled image, so the
//! annotation at `i` must reference the image and category at `i`.

use serde::{Deserialize, Serialize};

use super::ids::{AnnotationId, CategoryId, ImageId};

/// A fully parsed split manifest.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// One annotation per image-category assignment.
    pub annotations: Vec<AnnotationRecord>,

    /// Image records, positionally aligned with `annotations`.
    pub images: Vec<ImageRecord>,

    /// Category records, positionally aligned with `annotations`.
    pub categories: Vec<CategoryRecord>,
}

impl Manifest {
    /// Number of positions in the manifest, if all three arrays agree.
    pub fn aligned_len(&self) -> Option<usize> {
        let n = self.annotations.len();
        (self.images.len() == n && self.categories.len() == n).then_some(n)
    }
}

/// Links an image to a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub category_id: CategoryId,
}

impl AnnotationRecord {
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
        }
    }
}

/// An image file, relative to the dataset root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,

    /// Path relative to the dataset root, e.g. `train_val2018/Insecta/1455/a.jpg`.
    pub file_name: String,
}

impl ImageRecord {
    pub fn new(id: impl Into<ImageId>, file_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
        }
    }
}

/// A class label together with its taxonomic supercategory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,

    /// Class label used as the training target.
    #[serde(rename = "class")]
    pub class_label: String,

    /// Coarse grouping such as `Insecta` or `Fungi`.
    pub supercategory: String,
}

impl CategoryRecord {
    pub fn new(
        id: impl Into<CategoryId>,
        class_label: impl Into<String>,
        supercategory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            class_label: class_label.into(),
            supercategory: supercategory.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_class_field_is_named_class_on_the_wire() {
        let cat = CategoryRecord::new(4i64, "Aves", "Animalia");
        let json = serde_json::to_value(&cat).unwrap();
        assert_eq!(json["class"], "Aves");
        assert!(json.get("class_label").is_none());
    }

    #[test]
    fn test_aligned_len() {
        let mut manifest = Manifest {
            annotations: vec![AnnotationRecord::new(1i64, 1i64, 1i64)],
            images: vec![ImageRecord::new(1i64, "a.jpg")],
            categories: vec![CategoryRecord::new(1i64, "A", "Insecta")],
        };
        assert_eq!(manifest.aligned_len(), Some(1));

        manifest.images.clear();
        assert_eq!(manifest.aligned_len(), None);
    }
}
