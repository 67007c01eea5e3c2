//! Removal of intermediate files and the final report

use crate::error::{ResolutionResult, TaskError, TaskResult};
use crate::pipeline::{Artifact, Context, Inputs, Task, TaskId};
use crate::tasks::{find_files, PipelineParams, Reshape};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const STEPS: &[&str] = &[
    "Archive download",
    "Archive extraction",
    "Processing of text files into tables",
    "Removal of the raw text files",
    "Removal of the extracted directory",
];

/// Deletes the raw text inputs and the extraction directory, then writes
/// `readme.txt`, the terminal marker of the pipeline
pub struct Clean {
    params: Arc<PipelineParams>,
}

impl Clean {
    pub const NAME: &'static str = "Clean";

    pub fn new(params: Arc<PipelineParams>) -> Self {
        Clean { params }
    }
}

impl Task for Clean {
    fn id(&self) -> TaskId {
        self.params.task_id(Self::NAME)
    }

    fn requires(&self) -> ResolutionResult<Vec<Arc<dyn Task>>> {
        let reshape: Arc<dyn Task> = Arc::new(Reshape::new(self.params.clone()));
        Ok(vec![reshape])
    }

    fn outputs(&self) -> Vec<Artifact> {
        vec![Artifact::file(self.params.layout.readme())]
    }

    fn run(&self, ctx: &Context, _inputs: &Inputs) -> TaskResult<()> {
        let layout = &self.params.layout;
        let extracted = layout.extracted_dir();
        let mut removed = Vec::new();

        if extracted.exists() {
            for file in find_files(&extracted, "txt")? {
                fs::remove_file(&file).map_err(|e| TaskError::io(&file, e))?;
                info!(parent: &ctx.span, path = %file.display(), "removed raw text file");
                removed.push(file);
            }
            fs::remove_dir_all(&extracted).map_err(|e| TaskError::io(&extracted, e))?;
            info!(parent: &ctx.span, path = %extracted.display(), "removed extraction directory");
        }

        let readme = layout.readme();
        let dataset_dir = layout.dataset_dir();
        fs::create_dir_all(&dataset_dir).map_err(|e| TaskError::io(&dataset_dir, e))?;
        fs::write(&readme, render_report(&removed)).map_err(|e| TaskError::io(&readme, e))?;
        info!(parent: &ctx.span, path = %readme.display(), "report written");
        Ok(())
    }
}

/// Human-readable summary of the steps performed and the files removed
pub fn render_report(removed: &[PathBuf]) -> String {
    let mut out = String::from("Pipeline finished without errors\n\n");
    out.push_str("Steps ------------------------\n");
    for (i, step) in STEPS.iter().enumerate() {
        let _ = writeln!(out, "{}) {}", i + 1, step);
    }
    out.push_str("\n### Removed files ###\n");
    for path in removed {
        let _ = writeln!(out, "{}", path.display());
    }
    out
}
