//! Split manifests.
//!
//! A manifest is the JSON file describing every annotation, image and
//! category record of one dataset split (`train2018.json`, `val2018.json`,
//! `test2018.json`).
//!
//! # Example
//!
//! ```
//! use inatindex::manifest::io_json::from_manifest_str;
//!
//! let manifest = from_manifest_str(r#"{
//!     "annotations": [{"id": 1, "image_id": 1, "category_id": 7}],
//!     "images": [{"id": 1, "file_name": "Fungi/7/a.jpg"}],
//!     "categories": [{"id": 7, "class": "Agaricales", "supercategory": "Fungi"}]
//! }"#)?;
//! assert_eq!(manifest.aligned_len(), Some(1));
//! # Ok::<(), inatindex::DatasetError>(())
//! ```

mod ids;
pub mod io_json;
mod model;

pub use ids::{AnnotationId, CategoryId, ImageId};
pub use model::{AnnotationRecord, CategoryRecord, ImageRecord, Manifest};
