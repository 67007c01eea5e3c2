//! Splitting extracted text into tables
//!
//! A sample file is a sequence of sections, each opened by a `[Name]` line
//! and followed by tab-separated rows. Every section becomes one table; one
//! designated table also gets a reduced-column variant.

use crate::error::{ResolutionResult, TaskError, TaskResult};
use crate::pipeline::{Artifact, Context, Inputs, Task, TaskId};
use crate::tasks::{find_files, is_plain_name, Extract, PipelineParams};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct Reshape {
    params: Arc<PipelineParams>,
}

impl Reshape {
    pub const NAME: &'static str = "Reshape";

    pub fn new(params: Arc<PipelineParams>) -> Self {
        Reshape { params }
    }
}

impl Task for Reshape {
    fn id(&self) -> TaskId {
        self.params.task_id(Self::NAME)
    }

    fn requires(&self) -> ResolutionResult<Vec<Arc<dyn Task>>> {
        let extract: Arc<dyn Task> = Arc::new(Extract::new(self.params.clone()));
        Ok(vec![extract])
    }

    fn outputs(&self) -> Vec<Artifact> {
        let layout = &self.params.layout;
        self.params
            .tables
            .iter()
            .chain(std::iter::once(&self.params.reduce.name))
            .map(|name| Artifact::file(layout.table(name)))
            .collect()
    }

    fn run(&self, ctx: &Context, inputs: &Inputs) -> TaskResult<()> {
        let layout = &self.params.layout;
        let extracted = inputs
            .of(Extract::NAME)
            .and_then(|artifacts| artifacts.first())
            .map(|a| a.path().to_path_buf())
            .unwrap_or_else(|| layout.extracted_dir());

        let files = find_files(&extracted, "txt")?;
        if files.is_empty() {
            return Err(TaskError::MalformedInput {
                path: extracted,
                reason: "no .txt files to reshape".to_string(),
            });
        }

        for file in files {
            let text = fs::read_to_string(&file).map_err(|e| TaskError::io(&file, e))?;
            let sections = parse_sections(&text);
            if sections.is_empty() {
                return Err(TaskError::MalformedInput {
                    path: file,
                    reason: "no [Section] markers found".to_string(),
                });
            }
            if let Some(bad) = sections.iter().find(|s| !is_plain_name(&s.name)) {
                return Err(TaskError::MalformedInput {
                    path: file,
                    reason: format!("section name '{}' is not a valid table name", bad.name),
                });
            }

            for section in &sections {
                let path = write_table(&layout.table(&section.name), &section.rows)?;
                info!(parent: &ctx.span, table = %section.name, path = %path.display(), "table written");
            }

            let reduce = &self.params.reduce;
            if let Some(source) = sections.iter().find(|s| s.name == reduce.table) {
                let rows = drop_columns(&source.rows, &reduce.drop_columns)
                    .map_err(|reason| TaskError::MalformedInput {
                        path: file.clone(),
                        reason,
                    })?;
                let path = write_table(&layout.table(&reduce.name), &rows)?;
                info!(parent: &ctx.span, table = %reduce.name, path = %path.display(), "reduced table written");
            }
        }

        Ok(())
    }
}

/// One `[Name]` block of a sample file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub rows: Vec<String>,
}

/// Split text into sections. Lines before the first marker and blank lines
/// are dropped.
pub fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.starts_with('[') {
            let name = line.trim().trim_start_matches('[').trim_end_matches(']');
            sections.push(Section {
                name: name.to_string(),
                rows: Vec::new(),
            });
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        if let Some(current) = sections.last_mut() {
            current.rows.push(line.to_string());
        }
    }

    sections
}

/// Remove the named columns from a headed table. Every named column must
/// be present in the header.
pub fn drop_columns(rows: &[String], columns: &[String]) -> Result<Vec<String>, String> {
    let header = rows
        .first()
        .ok_or_else(|| "table has no header".to_string())?;
    let names: Vec<&str> = header.split('\t').collect();

    for column in columns {
        if !names.contains(&column.as_str()) {
            return Err(format!("column '{}' not found in header", column));
        }
    }

    let keep: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, name)| !columns.iter().any(|c| c == *name))
        .map(|(i, _)| i)
        .collect();

    Ok(rows
        .iter()
        .map(|row| {
            let cells: Vec<&str> = row.split('\t').collect();
            keep.iter()
                .map(|&i| cells.get(i).copied().unwrap_or(""))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect())
}

fn write_table(path: &Path, rows: &[String]) -> TaskResult<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| TaskError::io(parent, e))?;
    }
    let mut body = rows.join("\n");
    body.push('\n');
    fs::write(path, body).map_err(|e| TaskError::io(path, e))?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tasks::{MirrorRemote, Remote};
    use tempfile::TempDir;

    const SAMPLE: &str = "[Heading]\nDescriptor\tValue\nDate\t2015\n\n[Probes]\nSpecies\tProbe_Id\tDefinition\tSynonyms\nHs\tILMN_1\tdef\tsyn\n[Controls]\nArray_Address_Id\tProbe_Id\n1\tILMN_2\n[Columns]\nName\tType\n";

    #[test]
    fn test_parse_sections() {
        let sections = parse_sections("preamble\n[Heading]\na\tb\n\n[Probes]\r\nx\ty\r\n");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "Heading");
        assert_eq!(sections[0].rows, vec!["a\tb"]);
        assert_eq!(sections[1].name, "Probes");
        assert_eq!(sections[1].rows, vec!["x\ty"]);
    }

    #[test]
    fn test_parse_without_markers() {
        assert!(parse_sections("a\tb\nc\td\n").is_empty());
    }

    #[test]
    fn test_drop_columns() {
        let rows = vec!["A\tB\tC".to_string(), "1\t2\t3".to_string(), "4".to_string()];
        let reduced = drop_columns(&rows, &["B".to_string()]).unwrap();
        assert_eq!(reduced, vec!["A\tC", "1\t3", "4\t"]);
    }

    #[test]
    fn test_drop_missing_column() {
        let rows = vec!["A\tB".to_string()];
        assert!(drop_columns(&rows, &["Z".to_string()]).is_err());
    }

    #[test]
    fn test_reshape_writes_tables_and_reduced_variant() {
        let work = TempDir::new().unwrap();
        let remote: Arc<dyn Remote> = Arc::new(MirrorRemote::new("."));
        let mut config = Config::default();
        config.reduce.drop_columns = vec!["Definition".to_string(), "Synonyms".to_string()];
        let params = Arc::new(
            PipelineParams::from_config(&config, work.path().join("data"), remote).unwrap(),
        );

        let extracted = params.layout.extracted_dir();
        fs::create_dir_all(&extracted).unwrap();
        fs::write(extracted.join("GSM1.txt"), SAMPLE).unwrap();

        let reshape = Reshape::new(params.clone());
        reshape.run(&Context::new(), &Inputs::default()).unwrap();

        for artifact in reshape.outputs() {
            assert!(artifact.exists(), "{} missing", artifact);
        }
        let reduced = fs::read_to_string(params.layout.table("Probes_reduced")).unwrap();
        assert_eq!(reduced, "Species\tProbe_Id\nHs\tILMN_1\n");
        let heading = fs::read_to_string(params.layout.table("Heading")).unwrap();
        assert_eq!(heading, "Descriptor\tValue\nDate\t2015\n");
    }

    #[test]
    fn test_reshape_rejects_section_names_leaving_the_dataset() {
        let work = TempDir::new().unwrap();
        let remote: Arc<dyn Remote> = Arc::new(MirrorRemote::new("."));
        let data_dir = work.path().join("nested").join("data");
        let params = Arc::new(
            PipelineParams::from_config(&Config::default(), data_dir, remote).unwrap(),
        );
        let extracted = params.layout.extracted_dir();
        fs::create_dir_all(&extracted).unwrap();

        for marker in ["[../../escaped]", "[..]", "[]", "[a\\b]"] {
            let text = format!("{}{}\nx\ty\n", SAMPLE, marker);
            fs::write(extracted.join("GSM1.txt"), text).unwrap();

            let result = Reshape::new(params.clone()).run(&Context::new(), &Inputs::default());
            assert!(
                matches!(result, Err(TaskError::MalformedInput { .. })),
                "{} accepted",
                marker
            );
        }

        assert!(!work.path().join("nested").join("escaped").exists());
        assert!(!work.path().join("escaped.tsv").exists());
        assert!(!params.layout.table("Heading").exists());
    }

    #[test]
    fn test_reshape_without_markers_is_malformed() {
        let work = TempDir::new().unwrap();
        let remote: Arc<dyn Remote> = Arc::new(MirrorRemote::new("."));
        let params = Arc::new(
            PipelineParams::from_config(&Config::default(), work.path().join("data"), remote)
                .unwrap(),
        );
        let extracted = params.layout.extracted_dir();
        fs::create_dir_all(&extracted).unwrap();
        fs::write(extracted.join("GSM1.txt"), "no markers here\n").unwrap();

        let result = Reshape::new(params).run(&Context::new(), &Inputs::default());
        assert!(matches!(result, Err(TaskError::MalformedInput { .. })));
    }
}
