//! Configuration file parsing and discovery

use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult, GeopipeError};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["geopipe.yml", "geopipe.yaml"];

/// Environment variables that override file values
pub const ENV_DATA_DIR: &str = "GEOPIPE_DATA_DIR";
pub const ENV_SERIES: &str = "GEOPIPE_SERIES";
pub const ENV_DATASET: &str = "GEOPIPE_DATASET";

/// Values given on the command line; they win over file and environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub series: Option<String>,
    pub dataset: Option<String>,
}

/// Find the configuration file by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    let cwd = env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?;

    find_config_file_from(cwd).or_else(|err| match user_config_file() {
        Some(path) => Ok(path),
        None => Err(err),
    })
}

/// Find the configuration file starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                return Ok(config_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Per-user configuration file, if one exists
fn user_config_file() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "geopipe")?;
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dirs.config_dir().join(name))
        .find(|path| path.is_file())
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> Result<Config, GeopipeError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e)))?;

    parse_config(&contents)
}

/// Parse configuration from a string
pub fn parse_config(yaml: &str) -> Result<Config, GeopipeError> {
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load configuration: explicit file, else discovered file, else defaults.
///
/// `.env` is read first, then `GEOPIPE_*` variables and finally `overrides`
/// are applied on top.
pub fn load_config(
    explicit: Option<&Path>,
    overrides: &Overrides,
) -> Result<(Config, Option<PathBuf>), GeopipeError> {
    dotenvy::dotenv().ok();

    let (mut config, path) = match explicit {
        Some(path) => (parse_config_file(path)?, Some(path.to_path_buf())),
        None => match find_config_file() {
            Ok(path) => (parse_config_file(&path)?, Some(path)),
            Err(ConfigError::NotFound(_)) => (Config::default(), None),
            Err(e) => return Err(e.into()),
        },
    };

    apply_env(&mut config, |key| env::var(key).ok());
    apply_overrides(&mut config, overrides);
    config.normalize();

    Ok((config, path))
}

/// Apply `GEOPIPE_*` variables through the given lookup
pub fn apply_env<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(dir) = lookup(ENV_DATA_DIR) {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(series) = lookup(ENV_SERIES) {
        config.dataset.series = Some(series);
    }
    if let Some(name) = lookup(ENV_DATASET) {
        config.dataset.name = name;
    }
}

/// Apply command-line values
pub fn apply_overrides(config: &mut Config, overrides: &Overrides) {
    if let Some(dir) = &overrides.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(series) = &overrides.series {
        config.dataset.series = Some(series.clone());
    }
    if let Some(name) = &overrides.dataset {
        config.dataset.name = name.clone();
    }
}
