//! Dataset configuration.
//!
//! [`Split`] selects the manifest; [`DatasetConfig`] bundles the root
//! directory, split and supercategory selection so they can be kept in a
//! YAML or JSON file and handed to the CLI with `--config`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::DatasetError;
use crate::index::SupercategoryFilter;

/// A dataset split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    #[default]
    Train,
    Val,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }

    /// File name of this split's manifest, e.g. `train2018.json`.
    pub fn manifest_file_name(&self) -> String {
        format!("{}2018.json", self.as_str())
    }

    /// True for splits whose images come from the train/val archive.
    pub fn needs_trainval(&self) -> bool {
        matches!(self, Split::Train | Split::Val)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "train" => Ok(Split::Train),
            "val" => Ok(Split::Val),
            "test" => Ok(Split::Test),
            _ => Err(DatasetError::InvalidSplit {
                value: s.to_string(),
            }),
        }
    }
}

/// Supercategory selection as written in a config file.
///
/// ```yaml
/// supercategories: default      # the built-in ten
/// supercategories: all          # no filtering
/// supercategories: [Aves, Fungi]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SupercategorySelection {
    Named(Preset),
    List(Vec<String>),
}

/// Named selections usable in place of a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Default,
    All,
}

impl SupercategorySelection {
    pub fn to_filter(&self) -> SupercategoryFilter {
        match self {
            SupercategorySelection::Named(Preset::Default) => SupercategoryFilter::defaults(),
            SupercategorySelection::Named(Preset::All) => SupercategoryFilter::All,
            SupercategorySelection::List(names) => SupercategoryFilter::only(names.iter().cloned()),
        }
    }
}

/// Settings for opening a dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    /// Directory holding `{split}2018.json` and the image tree.
    pub root: Option<PathBuf>,
    pub split: Split,
    /// Omitted means the built-in default selection.
    pub supercategories: Option<SupercategorySelection>,
}

impl DatasetConfig {
    /// The filter this config selects.
    pub fn filter(&self) -> SupercategoryFilter {
        self.supercategories
            .as_ref()
            .map(SupercategorySelection::to_filter)
            .unwrap_or_default()
    }

    /// Loads a config file, YAML unless the extension is `.json`.
    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        let text = fs::read_to_string(path).map_err(|source| DatasetError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed: Result<DatasetConfig, String> = if is_json {
            serde_json::from_str(&text).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&text).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| DatasetError::ConfigParse {
            path: path.to_path_buf(),
            message,
        })
    }
}
