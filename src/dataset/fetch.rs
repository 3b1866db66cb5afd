//! Data acquisition hook.
//!
//! Downloading and unpacking the raw archives is not this crate's job. A
//! dataset built with `fetch_if_missing` calls a [`DataFetcher`] before it
//! reads the manifest; whatever the fetcher does, the manifest and images must
//! be under the root directory when it returns `Ok`.

use std::path::Path;

use crate::config::Split;
use crate::error::DatasetError;

/// Makes sure a split's manifest and images exist under a root directory.
pub trait DataFetcher: Send + Sync {
    /// `trainval` is true when the train/val image archive is needed, false
    /// for the test archive.
    fn ensure_present(&self, root: &Path, trainval: bool) -> Result<(), DatasetError>;
}

impl<F> DataFetcher for F
where
    F: Fn(&Path, bool) -> Result<(), DatasetError> + Send + Sync,
{
    fn ensure_present(&self, root: &Path, trainval: bool) -> Result<(), DatasetError> {
        self(root, trainval)
    }
}

/// Fetcher that downloads nothing and fails unless the manifests are present.
///
/// With `trainval` the train and val manifests are required, otherwise the
/// test manifest.
#[derive(Clone, Copy, Debug, Default)]
pub struct PresenceCheck;

impl DataFetcher for PresenceCheck {
    fn ensure_present(&self, root: &Path, trainval: bool) -> Result<(), DatasetError> {
        let splits: &[Split] = if trainval {
            &[Split::Train, Split::Val]
        } else {
            &[Split::Test]
        };

        let missing: Vec<String> = splits
            .iter()
            .map(Split::manifest_file_name)
            .filter(|name| !root.join(name).is_file())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DatasetError::FetchFailed {
                root: root.to_path_buf(),
                message: format!("missing {}", missing.join(", ")),
            })
        }
    }
}
