//! Archive extraction
//!
//! Unpacks the tar container into a staging directory, gunzips every nested
//! member in place, then publishes the staging directory by rename.

use crate::error::{ResolutionResult, TaskError, TaskResult};
use crate::pipeline::{Artifact, Context, Inputs, Task, TaskId};
use crate::tasks::{find_files, Fetch, PipelineParams};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub struct Extract {
    params: Arc<PipelineParams>,
}

impl Extract {
    pub const NAME: &'static str = "Extract";

    pub fn new(params: Arc<PipelineParams>) -> Self {
        Extract { params }
    }
}

impl Task for Extract {
    fn id(&self) -> TaskId {
        self.params.task_id(Self::NAME)
    }

    fn requires(&self) -> ResolutionResult<Vec<Arc<dyn Task>>> {
        let fetch: Arc<dyn Task> = Arc::new(Fetch::new(self.params.clone(), self.id())?);
        Ok(vec![fetch])
    }

    fn outputs(&self) -> Vec<Artifact> {
        vec![Artifact::directory(self.params.layout.extracted_dir())]
    }

    fn run(&self, ctx: &Context, inputs: &Inputs) -> TaskResult<()> {
        let layout = &self.params.layout;
        let archive = inputs
            .of(Fetch::NAME)
            .and_then(|artifacts| artifacts.first())
            .map(|a| a.path().to_path_buf())
            .unwrap_or_else(|| layout.archive());

        let staging = layout.extracted_staging();
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| TaskError::io(&staging, e))?;
        }
        fs::create_dir_all(&staging).map_err(|e| TaskError::io(&staging, e))?;

        let count = unpack(&archive, &staging)?;
        info!(parent: &ctx.span, entries = count, archive = %archive.display(), "unpacked archive");

        for compressed in find_files(&staging, "gz")? {
            let plain = gunzip(&compressed)?;
            debug!(parent: &ctx.span, path = %plain.display(), "decompressed member");
        }

        let extracted = layout.extracted_dir();
        if extracted.exists() {
            fs::remove_dir_all(&extracted).map_err(|e| TaskError::io(&extracted, e))?;
        }
        fs::rename(&staging, &extracted).map_err(|e| TaskError::io(&extracted, e))?;
        info!(parent: &ctx.span, path = %extracted.display(), "extraction published");
        Ok(())
    }
}

fn corrupt(path: &Path, reason: impl ToString) -> TaskError {
    TaskError::CorruptArchive {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Unpack every entry of a tar archive under `dest`; returns the entry count
fn unpack(archive_path: &Path, dest: &Path) -> TaskResult<usize> {
    let file = File::open(archive_path).map_err(|e| TaskError::io(archive_path, e))?;
    let mut archive = tar::Archive::new(file);

    let mut count = 0;
    for entry in archive.entries().map_err(|e| corrupt(archive_path, e))? {
        let mut entry = entry.map_err(|e| corrupt(archive_path, e))?;
        entry
            .unpack_in(dest)
            .map_err(|e| corrupt(archive_path, e))?;
        count += 1;
    }

    if count == 0 {
        return Err(corrupt(archive_path, "archive contains no entries"));
    }
    Ok(count)
}

/// Decompress `x.gz` into `x` and remove the compressed file
fn gunzip(compressed: &Path) -> TaskResult<PathBuf> {
    let plain = compressed.with_extension("");
    let input = File::open(compressed).map_err(|e| TaskError::io(compressed, e))?;
    let mut output = File::create(&plain).map_err(|e| TaskError::io(&plain, e))?;

    io::copy(&mut GzDecoder::new(input), &mut output).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
            corrupt(compressed, e)
        }
        _ => TaskError::io(&plain, e),
    })?;

    fs::remove_file(compressed).map_err(|e| TaskError::io(compressed, e))?;
    Ok(plain)
}
