//! Persisted artifact namespace
//!
//! Every path a task reads or promises is derived here from the data
//! directory and the dataset name, so identical parameters always yield
//! identical artifacts.

use std::path::{Path, PathBuf};

/// Whether `name` can be used as a single path component under the data
/// directory without leaving it
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    data_dir: PathBuf,
    dataset: String,
}

impl Layout {
    pub fn new(data_dir: impl Into<PathBuf>, dataset: impl Into<String>) -> Self {
        Layout {
            data_dir: data_dir.into(),
            dataset: dataset.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// `{data_dir}/{dataset}_RAW`
    pub fn archive(&self) -> PathBuf {
        self.data_dir.join(format!("{}_RAW", self.dataset))
    }

    /// Download in progress, renamed onto `archive()` once complete
    pub fn archive_partial(&self) -> PathBuf {
        self.data_dir.join(format!("{}_RAW.part", self.dataset))
    }

    /// `{data_dir}/{dataset}`
    pub fn dataset_dir(&self) -> PathBuf {
        self.data_dir.join(&self.dataset)
    }

    /// `{data_dir}/{dataset}/extracted`
    pub fn extracted_dir(&self) -> PathBuf {
        self.dataset_dir().join("extracted")
    }

    /// Extraction in progress, renamed onto `extracted_dir()` once complete
    pub fn extracted_staging(&self) -> PathBuf {
        self.dataset_dir().join("extracted.partial")
    }

    /// `{data_dir}/{dataset}/{table}/{table}.tsv`
    pub fn table(&self, name: &str) -> PathBuf {
        self.dataset_dir().join(name).join(format!("{}.tsv", name))
    }

    /// `{data_dir}/{dataset}/readme.txt`
    pub fn readme(&self) -> PathBuf {
        self.dataset_dir().join("readme.txt")
    }
}
