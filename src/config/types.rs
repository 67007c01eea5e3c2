//! Core configuration types
//!
//! This module defines the data structures that represent a geopipe.yml
//! configuration file. Every key is optional.

use crate::pipeline::CompletionPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default GEO series listing the supplementary files live under
pub const DEFAULT_BASE_URL: &str =
    "https://ftp.ncbi.nlm.nih.gov/geo/series/${series}/${name}/suppl/";

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root directory of every artifact
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Which dataset to process
    #[serde(default)]
    pub dataset: Dataset,

    /// Where the archive is discovered and downloaded from
    #[serde(default)]
    pub source: Source,

    /// Sections written as tables by the reshape step
    #[serde(default = "default_tables")]
    pub tables: Vec<String>,

    /// Reduced-column variant of one table
    #[serde(default)]
    pub reduce: Reduce,

    /// How strictly declared outputs are inspected
    #[serde(default)]
    pub completion: CompletionPolicy,
}

/// Dataset identifiers
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    /// Series bucket, e.g. `GSE68nnn`; derived from the name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,

    /// Dataset accession, e.g. `GSE68849`
    #[serde(default = "default_dataset_name")]
    pub name: String,
}

/// Remote listing settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Source {
    /// Listing URL; `${series}` and `${name}` are substituted
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Substring a link must contain to be picked as the archive
    #[serde(default = "default_link_pattern")]
    pub link_pattern: String,

    /// Local directory served instead of the listing server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<PathBuf>,
}

/// Column reduction settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Reduce {
    /// Table the reduced variant is derived from
    #[serde(default = "default_reduce_table")]
    pub table: String,

    /// Name of the reduced table
    #[serde(default = "default_reduce_name")]
    pub name: String,

    /// Columns dropped from the source table
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
}

impl Config {
    /// Strip surrounding whitespace from identifiers that become paths
    pub fn normalize(&mut self) {
        self.dataset.name = self.dataset.name.trim().to_string();
        if let Some(series) = &mut self.dataset.series {
            *series = series.trim().to_string();
        }
    }

    /// Series identifier, explicit or derived from the dataset name
    pub fn series(&self) -> Option<String> {
        self.dataset
            .series
            .clone()
            .or_else(|| series_for(&self.dataset.name))
    }
}

/// GEO buckets series by replacing the last three digits with `nnn`.
///
/// `GSE68849` lives in `GSE68nnn`, `GSE1` in `GSEnnn`.
pub fn series_for(name: &str) -> Option<String> {
    let digits_at = name.find(|c: char| c.is_ascii_digit())?;
    let (prefix, digits) = name.split_at(digits_at);
    if prefix.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let keep = digits.len().saturating_sub(3);
    Some(format!("{}{}nnn", prefix, &digits[..keep]))
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_dir(),
            dataset: Dataset::default(),
            source: Source::default(),
            tables: default_tables(),
            reduce: Reduce::default(),
            completion: CompletionPolicy::default(),
        }
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Dataset {
            series: None,
            name: default_dataset_name(),
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Source {
            base_url: default_base_url(),
            link_pattern: default_link_pattern(),
            mirror: None,
        }
    }
}

impl Default for Reduce {
    fn default() -> Self {
        Reduce {
            table: default_reduce_table(),
            name: default_reduce_name(),
            drop_columns: default_drop_columns(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_dataset_name() -> String {
    "GSE68849".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_link_pattern() -> String {
    "RAW.tar".to_string()
}

fn default_tables() -> Vec<String> {
    ["Heading", "Probes", "Controls", "Columns"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_reduce_table() -> String {
    "Probes".to_string()
}

fn default_reduce_name() -> String {
    "Probes_reduced".to_string()
}

fn default_drop_columns() -> Vec<String> {
    [
        "Definition",
        "Ontology_Component",
        "Ontology_Process",
        "Ontology_Function",
        "Synonyms",
        "Obsolete_Probe_Id",
        "Probe_Sequence",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
