//! Random-access image dataset over a [`FilteredIndex`].
//!
//! The index is built once, when the dataset is constructed. Images are
//! loaded on every [`IndexedImageDataset::get`] call and never cached, so the
//! dataset can be far larger than memory. Nothing is written after
//! construction; concurrent `get` calls on a shared instance are fine.
//!
//! # Example
//!
//! ```no_run
//! use inatindex::dataset::IndexedImageDataset;
//! use inatindex::config::Split;
//! use inatindex::index::SupercategoryFilter;
//!
//! let dataset = IndexedImageDataset::builder("/data/inaturalist2018")
//!     .split(Split::Val)
//!     .supercategories(SupercategoryFilter::only(["Aves", "Fungi"]))
//!     .image_transform(|img| img.dimensions())
//!     .build()?;
//!
//! let ((width, height), label) = dataset.get(0)?;
//! println!("{width}x{height} {label}");
//! # Ok::<(), inatindex::DatasetError>(())
//! ```

pub mod fetch;
pub mod loader;

use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::config::Split;
use crate::diagnostics::{DiagnosticsSink, LogSink};
use crate::error::DatasetError;
use crate::index::{build_index, FilteredIndex, IndexEntry, SupercategoryFilter};

pub use fetch::{DataFetcher, PresenceCheck};
pub use loader::load_rgb;

type LoaderFn<R> = Box<dyn Fn(&Path) -> Result<R, DatasetError> + Send + Sync>;
type TransformFn<R, S> = Box<dyn Fn(R) -> S + Send + Sync>;
type LabelFn<L> = Box<dyn Fn(&str) -> L + Send + Sync>;

/// Collects the construction parameters of an [`IndexedImageDataset`].
///
/// `R` is what the loader returns, `S` the sample after the image transform,
/// `L` the label after the label transform.
pub struct DatasetBuilder<R = RgbImage, S = RgbImage, L = String> {
    root: PathBuf,
    split: Split,
    filter: SupercategoryFilter,
    fetch_if_missing: bool,
    fetcher: Box<dyn DataFetcher>,
    sink: Box<dyn DiagnosticsSink>,
    loader: LoaderFn<R>,
    image_transform: TransformFn<R, S>,
    label_transform: LabelFn<L>,
}

impl DatasetBuilder {
    /// Starts a builder with the train split, the default supercategories,
    /// the RGB loader, no transforms, no fetching and `log` diagnostics.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            split: Split::default(),
            filter: SupercategoryFilter::default(),
            fetch_if_missing: false,
            fetcher: Box::new(PresenceCheck),
            sink: Box::new(LogSink),
            loader: Box::new(load_rgb),
            image_transform: Box::new(|image: RgbImage| image),
            label_transform: Box::new(str::to_string),
        }
    }
}

impl<R: 'static, S: 'static, L: 'static> DatasetBuilder<R, S, L> {
    pub fn split(mut self, split: Split) -> Self {
        self.split = split;
        self
    }

    /// Sets which supercategories to keep. Use [`SupercategoryFilter::All`]
    /// to disable filtering.
    pub fn supercategories(mut self, filter: SupercategoryFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Whether to run the data fetcher before reading the manifest.
    pub fn fetch_if_missing(mut self, fetch: bool) -> Self {
        self.fetch_if_missing = fetch;
        self
    }

    /// Replaces the data fetcher (default: [`PresenceCheck`]).
    pub fn fetcher(mut self, fetcher: impl DataFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    /// Replaces the diagnostics sink (default: [`LogSink`]).
    pub fn diagnostics(mut self, sink: impl DiagnosticsSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replaces the image loader.
    ///
    /// This also resets the image transform to the identity, since the old
    /// one expects the old loader's output type.
    pub fn loader<R2: 'static>(
        self,
        loader: impl Fn(&Path) -> Result<R2, DatasetError> + Send + Sync + 'static,
    ) -> DatasetBuilder<R2, R2, L> {
        DatasetBuilder {
            root: self.root,
            split: self.split,
            filter: self.filter,
            fetch_if_missing: self.fetch_if_missing,
            fetcher: self.fetcher,
            sink: self.sink,
            loader: Box::new(loader),
            image_transform: Box::new(|image: R2| image),
            label_transform: self.label_transform,
        }
    }

    /// Sets the function applied to every loaded image.
    pub fn image_transform<S2>(
        self,
        transform: impl Fn(R) -> S2 + Send + Sync + 'static,
    ) -> DatasetBuilder<R, S2, L> {
        DatasetBuilder {
            root: self.root,
            split: self.split,
            filter: self.filter,
            fetch_if_missing: self.fetch_if_missing,
            fetcher: self.fetcher,
            sink: self.sink,
            loader: self.loader,
            image_transform: Box::new(transform),
            label_transform: self.label_transform,
        }
    }

    /// Sets the function applied to every class label.
    pub fn label_transform<L2>(
        self,
        transform: impl Fn(&str) -> L2 + Send + Sync + 'static,
    ) -> DatasetBuilder<R, S, L2> {
        DatasetBuilder {
            root: self.root,
            split: self.split,
            filter: self.filter,
            fetch_if_missing: self.fetch_if_missing,
            fetcher: self.fetcher,
            sink: self.sink,
            loader: self.loader,
            image_transform: self.image_transform,
            label_transform: Box::new(transform),
        }
    }

    /// Fetches data if asked to, then reads and indexes the split manifest.
    ///
    /// # Errors
    /// Fails if the fetcher fails, or with any error of
    /// [`build_index`](crate::index::build_index).
    pub fn build(self) -> Result<IndexedImageDataset<R, S, L>, DatasetError> {
        if self.fetch_if_missing {
            self.sink.info(&format!(
                "Ensuring {} data is present under {}",
                self.split,
                self.root.display()
            ));
            self.fetcher
                .ensure_present(&self.root, self.split.needs_trainval())?;
        }

        let manifest_path = self.root.join(self.split.manifest_file_name());
        let index = build_index(&manifest_path, &self.filter, &*self.sink)?;

        Ok(IndexedImageDataset {
            root: self.root,
            split: self.split,
            index,
            loader: self.loader,
            image_transform: self.image_transform,
            label_transform: self.label_transform,
        })
    }
}

/// Lazily loaded `(sample, label)` pairs for one split.
pub struct IndexedImageDataset<R = RgbImage, S = RgbImage, L = String> {
    root: PathBuf,
    split: Split,
    index: FilteredIndex,
    loader: LoaderFn<R>,
    image_transform: TransformFn<R, S>,
    label_transform: LabelFn<L>,
}

impl IndexedImageDataset {
    pub fn builder(root: impl Into<PathBuf>) -> DatasetBuilder {
        DatasetBuilder::new(root)
    }

    /// Opens a split with the default supercategories and no transforms.
    pub fn open(root: impl Into<PathBuf>, split: Split) -> Result<Self, DatasetError> {
        DatasetBuilder::new(root).split(split).build()
    }
}

impl<R, S, L> IndexedImageDataset<R, S, L> {
    /// Number of images kept by the supercategory filter.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Loads the image at `index` and returns it with its label, both
    /// passed through their transforms.
    ///
    /// # Errors
    /// - [`DatasetError::IndexOutOfRange`] if `index >= self.len()`.
    /// - Whatever the loader returns (for the default loader,
    ///   [`DatasetError::FileAccess`] or [`DatasetError::ImageDecode`]).
    pub fn get(&self, index: usize) -> Result<(S, L), DatasetError> {
        let entry = self.checked_entry(index)?;
        let image = (self.loader)(&self.root.join(entry.file_name))?;

        let sample = (self.image_transform)(image);
        let label = (self.label_transform)(entry.class_label);
        Ok((sample, label))
    }

    /// Like [`get`](Self::get), for callers holding a signed index.
    ///
    /// Negative indices are rejected; there is no wraparound.
    pub fn get_signed(&self, index: i64) -> Result<(S, L), DatasetError> {
        self.get(self.checked_position(index)?)
    }

    /// Converts a signed index into a position valid for [`get`](Self::get).
    ///
    /// # Errors
    /// [`DatasetError::IndexOutOfRange`] if `index` is negative or `>= self.len()`.
    pub fn checked_position(&self, index: i64) -> Result<usize, DatasetError> {
        usize::try_from(index)
            .ok()
            .filter(|&position| position < self.len())
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    /// Loads every item in order.
    pub fn iter(&self) -> impl Iterator<Item = Result<(S, L), DatasetError>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Absolute path of the image at `index`.
    pub fn image_path(&self, index: usize) -> Result<PathBuf, DatasetError> {
        Ok(self.root.join(self.checked_entry(index)?.file_name))
    }

    /// Supercategory of the image at `index`.
    pub fn supercategory_target(&self, index: usize) -> Result<&str, DatasetError> {
        Ok(self.checked_entry(index)?.supercategory)
    }

    pub fn index(&self) -> &FilteredIndex {
        &self.index
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn split(&self) -> Split {
        self.split
    }

    fn checked_entry(&self, index: usize) -> Result<IndexEntry<'_>, DatasetError> {
        self.index
            .entry(index)
            .ok_or_else(|| DatasetError::IndexOutOfRange {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len: self.len(),
            })
    }
}

impl<R, S, L> fmt::Debug for IndexedImageDataset<R, S, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedImageDataset")
            .field("root", &self.root)
            .field("split", &self.split)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const MANIFEST: &str = r#"{
        "annotations": [
            {"id": 1, "image_id": 1, "category_id": 1},
            {"id": 2, "image_id": 2, "category_id": 2},
            {"id": 3, "image_id": 3, "category_id": 3}
        ],
        "images": [
            {"id": 1, "file_name": "Insecta/a.png"},
            {"id": 2, "file_name": "Fungi/b.png"},
            {"id": 3, "file_name": "Insecta/c.png"}
        ],
        "categories": [
            {"id": 1, "class": "A", "supercategory": "Insecta"},
            {"id": 2, "class": "B", "supercategory": "Fungi"},
            {"id": 3, "class": "A", "supercategory": "Insecta"}
        ]
    }"#;

    fn fixture_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("train2018.json"), MANIFEST).unwrap();
        for (name, width) in [("Insecta/a.png", 2), ("Fungi/b.png", 3), ("Insecta/c.png", 4)] {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            RgbImage::new(width, 1).save(&path).unwrap();
        }
        dir
    }

    #[test]
    fn test_get_loads_and_labels() {
        let root = fixture_root();
        let dataset = IndexedImageDataset::builder(root.path())
            .supercategories(SupercategoryFilter::All)
            .diagnostics(MemorySink::new())
            .build()
            .expect("build failed");

        assert_eq!(dataset.len(), 3);
        let (image, label) = dataset.get(1).unwrap();
        assert_eq!(image.dimensions(), (3, 1));
        assert_eq!(label, "B");
        assert_eq!(dataset.supercategory_target(1).unwrap(), "Fungi");
    }

    #[test]
    fn test_out_of_range_has_no_wraparound() {
        let root = fixture_root();
        let dataset = IndexedImageDataset::builder(root.path())
            .supercategories(SupercategoryFilter::only(["Insecta"]))
            .build()
            .unwrap();

        assert_eq!(dataset.len(), 2);
        assert!(matches!(
            dataset.get(2),
            Err(DatasetError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(
            dataset.get_signed(-1),
            Err(DatasetError::IndexOutOfRange { index: -1, len: 2 })
        ));
    }

    #[test]
    fn test_checked_position() {
        let root = fixture_root();
        let dataset = IndexedImageDataset::builder(root.path())
            .supercategories(SupercategoryFilter::All)
            .build()
            .unwrap();

        assert_eq!(dataset.checked_position(0).unwrap(), 0);
        assert_eq!(dataset.checked_position(2).unwrap(), 2);
        assert!(matches!(
            dataset.checked_position(3),
            Err(DatasetError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            dataset.checked_position(-1),
            Err(DatasetError::IndexOutOfRange { index: -1, len: 3 })
        ));
        assert!(matches!(
            dataset.checked_position(i64::MIN),
            Err(DatasetError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_transforms_apply_on_every_call() {
        let root = fixture_root();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let dataset = IndexedImageDataset::builder(root.path())
            .supercategories(SupercategoryFilter::All)
            .image_transform(move |image: RgbImage| {
                counter.fetch_add(1, Ordering::SeqCst);
                image.width()
            })
            .label_transform(|label| label.to_lowercase())
            .build()
            .unwrap();

        assert_eq!(dataset.get(2).unwrap(), (4, "a".to_string()));
        assert_eq!(dataset.get(2).unwrap(), (4, "a".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_custom_loader_resets_image_transform() {
        let root = fixture_root();
        let dataset = IndexedImageDataset::builder(root.path())
            .supercategories(SupercategoryFilter::All)
            .image_transform(|image: RgbImage| image.width())
            .loader(|path: &Path| Ok(path.to_path_buf()))
            .build()
            .unwrap();

        let (path, _) = dataset.get(0).unwrap();
        assert_eq!(path, root.path().join("Insecta/a.png"));
    }

    #[test]
    fn test_fetcher_runs_only_when_asked() {
        let root = fixture_root();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fetcher = move |_: &Path, trainval: bool| -> Result<(), DatasetError> {
            assert!(trainval);
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        IndexedImageDataset::builder(root.path())
            .fetcher(fetcher.clone())
            .build()
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        IndexedImageDataset::builder(root.path())
            .fetcher(fetcher)
            .fetch_if_missing(true)
            .build()
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fetch_failure_fails_construction() {
        let root = tempfile::tempdir().unwrap();
        let err = IndexedImageDataset::builder(root.path())
            .split(Split::Test)
            .fetch_if_missing(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, DatasetError::FetchFailed { .. }));
    }

    #[test]
    fn test_dataset_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IndexedImageDataset>();
        assert_send_sync::<IndexedImageDataset<RgbImage, Vec<f32>, usize>>();
    }
}
