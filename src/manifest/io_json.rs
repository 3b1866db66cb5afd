//! Manifest JSON reader.
//!
//! The top-level object must carry the three arrays `annotations`, `images`
//! and `categories`; anything else is a parse error. Elements are decoded into
//! their record types one at a time while the array streams past, and a
//! malformed element is reported as a consistency error naming the array and
//! the position, since the document itself is valid JSON.
//!
//! Unknown keys are ignored at both levels, so full iNaturalist manifests
//! (with `info`, `licenses`, image sizes, taxonomy ranks, ...) load as-is.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{DeserializeOwned, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::model::{AnnotationRecord, CategoryRecord, ImageRecord, Manifest};
use crate::error::DatasetError;

#[derive(Debug, Deserialize)]
struct RawManifest {
    annotations: Records<AnnotationRecord>,
    images: Records<ImageRecord>,
    categories: Records<CategoryRecord>,
}

/// The records of one array, plus the first element that failed to decode.
///
/// Only one element is held as an untyped [`serde_json::Value`] at a time. Once an
/// element fails, the rest of the array is skipped without decoding.
#[derive(Debug)]
struct Records<T> {
    items: Vec<T>,
    malformed: Option<(usize, String)>,
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Records<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(RecordsVisitor(PhantomData))
    }
}

struct RecordsVisitor<T>(PhantomData<T>);

impl<'de, T: DeserializeOwned> Visitor<'de> for RecordsVisitor<T> {
    type Value = Records<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of records")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));

        while let Some(value) = seq.next_element::<serde_json::Value>()? {
            match serde_json::from_value(value) {
                Ok(record) => items.push(record),
                Err(err) => {
                    let malformed = Some((items.len(), err.to_string()));
                    while seq.next_element::<IgnoredAny>()?.is_some() {}
                    return Ok(Records { items, malformed });
                }
            }
        }

        Ok(Records {
            items,
            malformed: None,
        })
    }
}

impl<T> Records<T> {
    fn into_checked(self, array: &str) -> Result<Vec<T>, DatasetError> {
        match self.malformed {
            None => Ok(self.items),
            Some((position, reason)) => Err(DatasetError::consistency(format!(
                "malformed record in '{array}' at position {position}: {reason}"
            ))),
        }
    }
}

/// Reads a manifest from a JSON file.
///
/// # Errors
/// - [`DatasetError::FileAccess`] if the file cannot be opened.
/// - [`DatasetError::ManifestParse`] if it is not JSON or lacks one of the arrays.
/// - [`DatasetError::ManifestConsistency`] if a record is malformed.
pub fn read_manifest_json(path: &Path) -> Result<Manifest, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let raw: RawManifest =
        serde_json::from_reader(reader).map_err(|source| DatasetError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;

    decode_records(raw)
}

/// Reads a manifest from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_manifest_str(json: &str) -> Result<Manifest, DatasetError> {
    let raw: RawManifest =
        serde_json::from_str(json).map_err(|source| DatasetError::ManifestParse {
            path: "<string>".into(),
            source,
        })?;
    decode_records(raw)
}

/// Reads a manifest from a JSON byte slice.
///
/// Useful for fuzzing and for callers that already hold the bytes.
pub fn from_manifest_slice(bytes: &[u8]) -> Result<Manifest, DatasetError> {
    let raw: RawManifest =
        serde_json::from_slice(bytes).map_err(|source| DatasetError::ManifestParse {
            path: "<bytes>".into(),
            source,
        })?;
    decode_records(raw)
}

fn decode_records(raw: RawManifest) -> Result<Manifest, DatasetError> {
    Ok(Manifest {
        annotations: raw.annotations.into_checked("annotations")?,
        images: raw.images.into_checked("images")?,
        categories: raw.categories.into_checked("categories")?,
    })
}
