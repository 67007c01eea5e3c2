//! Integration tests for configuration parsing and validation

use geopipe::config::{
    apply_env, apply_overrides, find_config_file_from, parse_config, parse_config_file,
    validate_config, Overrides,
};
use geopipe::error::{ConfigError, GeopipeError};
use geopipe::pipeline::CompletionPolicy;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_parse_complete_config() {
    let yaml = r#"
data_dir: /var/lib/geo
dataset:
  name: GSE12345
source:
  base_url: "https://mirror.example/${series}/${name}/"
  link_pattern: "_RAW.tar"
tables: [Heading, Probes, Controls]
reduce:
  table: Probes
  name: Probes_small
  drop_columns: [Definition, Synonyms]
completion: non-empty
"#;

    let config = parse_config(yaml).unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.data_dir, PathBuf::from("/var/lib/geo"));
    assert_eq!(config.series(), Some("GSE12nnn".to_string()));
    assert_eq!(config.tables, vec!["Heading", "Probes", "Controls"]);
    assert_eq!(config.reduce.drop_columns, vec!["Definition", "Synonyms"]);
    assert_eq!(config.completion, CompletionPolicy::NonEmpty);
}

#[test]
fn test_empty_file_uses_defaults() {
    let config = parse_config("  \n").unwrap();
    validate_config(&config).unwrap();
    assert_eq!(config.dataset.name, "GSE68849");
    assert_eq!(config.series(), Some("GSE68nnn".to_string()));
}

#[test]
fn test_invalid_yaml() {
    let result = parse_config("tables: [Heading\n");
    assert!(matches!(result, Err(GeopipeError::Yaml(_))));
}

#[test]
fn test_parse_from_file_in_parent_directory() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("geopipe.yaml");
    fs::write(&config_path, "data_dir: store\n").unwrap();
    let sub_dir = temp.path().join("a").join("b");
    fs::create_dir_all(&sub_dir).unwrap();

    let found = find_config_file_from(sub_dir).unwrap();
    assert_eq!(found, config_path);

    let config = parse_config_file(&found).unwrap();
    assert_eq!(config.data_dir, PathBuf::from("store"));
}

#[test]
fn test_missing_file_is_config_error() {
    let temp = TempDir::new().unwrap();
    let result = parse_config_file(&temp.path().join("geopipe.yml"));
    assert!(matches!(result, Err(GeopipeError::Config(ConfigError::Invalid(_)))));
}

#[test]
fn test_precedence_file_env_flags() {
    let mut config = parse_config("data_dir: from_file\ndataset:\n  name: GSE1111\n").unwrap();

    apply_env(&mut config, |key| match key {
        "GEOPIPE_DATA_DIR" => Some("from_env".to_string()),
        "GEOPIPE_DATASET" => Some("GSE2222".to_string()),
        _ => None,
    });
    assert_eq!(config.data_dir, PathBuf::from("from_env"));
    assert_eq!(config.dataset.name, "GSE2222");

    apply_overrides(
        &mut config,
        &Overrides {
            data_dir: Some(PathBuf::from("from_flag")),
            ..Overrides::default()
        },
    );
    assert_eq!(config.data_dir, PathBuf::from("from_flag"));
    assert_eq!(config.dataset.name, "GSE2222");
    assert_eq!(config.series(), Some("GSE2nnn".to_string()));
}

#[test]
fn test_inconsistent_series_rejected() {
    let config = parse_config("dataset:\n  series: GSE99nnn\n  name: GSE68849\n").unwrap();
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_unknown_base_url_variable_rejected() {
    let config = parse_config("source:\n  base_url: \"https://x/${accession}/\"\n").unwrap();
    assert!(validate_config(&config).is_err());
}
