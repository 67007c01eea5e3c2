//! Domain tasks
//!
//! Fetch, Extract, Reshape and Clean, wired as a chain whose terminal
//! artifact is the dataset's `readme.txt`.

pub mod clean;
pub mod extract;
pub mod fetch;
pub mod layout;
pub mod remote;
pub mod reshape;

pub use clean::Clean;
pub use extract::Extract;
pub use fetch::Fetch;
pub use layout::{is_plain_name, Layout};
pub use remote::{find_link, HttpRemote, MirrorRemote, Remote};
pub use reshape::Reshape;

use crate::config::{interpolate, Config, Reduce};
use crate::error::{ConfigError, GeopipeError, TaskError, TaskResult};
use crate::pipeline::{Task, TaskId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything the domain tasks are parameterised by
pub struct PipelineParams {
    pub layout: Layout,
    pub series: String,
    pub listing_url: String,
    pub link_pattern: String,
    pub tables: Vec<String>,
    pub reduce: Reduce,
    pub remote: Arc<dyn Remote>,
}

impl PipelineParams {
    /// Derive task parameters from configuration. `data_dir` is the
    /// configured directory already resolved against the working directory.
    pub fn from_config(
        config: &Config,
        data_dir: PathBuf,
        remote: Arc<dyn Remote>,
    ) -> Result<Self, GeopipeError> {
        let name = config.dataset.name.clone();
        let series = config
            .series()
            .ok_or_else(|| ConfigError::MissingParameter("dataset.series".to_string()))?;

        let vars: HashMap<String, String> = [
            ("series".to_string(), series.clone()),
            ("name".to_string(), name.clone()),
        ]
        .into_iter()
        .collect();
        let listing_url = interpolate(&config.source.base_url, &vars)?;

        Ok(PipelineParams {
            layout: Layout::new(data_dir, name),
            series,
            listing_url,
            link_pattern: config.source.link_pattern.clone(),
            tables: config.tables.clone(),
            reduce: config.reduce.clone(),
            remote,
        })
    }

    /// Identity shared by every task of the chain
    fn task_id(&self, name: &str) -> TaskId {
        TaskId::with_params(
            name,
            [
                ("data_dir", self.layout.data_dir().display().to_string()),
                ("dataset", self.layout.dataset().to_string()),
            ],
        )
    }
}

/// The terminal task of the full pipeline
pub fn build_pipeline(params: Arc<PipelineParams>) -> Arc<dyn Task> {
    Arc::new(Clean::new(params))
}

/// Files under `dir` (recursively) with the given extension, sorted
pub(crate) fn find_files(dir: &Path, extension: &str) -> TaskResult<Vec<PathBuf>> {
    let root = dir.to_str().ok_or_else(|| TaskError::MalformedInput {
        path: dir.to_path_buf(),
        reason: "path is not valid UTF-8".to_string(),
    })?;
    let pattern = format!("{}/**/*.{}", glob::Pattern::escape(root), extension);

    let paths = glob::glob(&pattern).map_err(|e| TaskError::MalformedInput {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            TaskError::io(path, e.into())
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
