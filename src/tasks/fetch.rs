//! Archive download

use crate::error::{ResolutionError, ResolutionResult, TaskError, TaskResult};
use crate::pipeline::{Artifact, Context, Inputs, Task, TaskId};
use crate::tasks::{find_link, PipelineParams};
use std::fs;
use std::sync::Arc;
use tracing::info;

/// Finds the archive link in the series listing and downloads it
pub struct Fetch {
    params: Arc<PipelineParams>,
}

impl Fetch {
    pub const NAME: &'static str = "Fetch";

    /// Fails when a parameter the download depends on is missing
    pub fn new(params: Arc<PipelineParams>, requested_by: TaskId) -> ResolutionResult<Self> {
        let missing = if params.series.trim().is_empty() {
            Some("series")
        } else if params.listing_url.trim().is_empty() {
            Some("listing_url")
        } else {
            None
        };

        match missing {
            Some(param) => Err(ResolutionError::UnknownDependency {
                task: requested_by,
                reason: format!("{} requires parameter '{}'", Self::NAME, param),
            }),
            None => Ok(Fetch { params }),
        }
    }
}

impl Task for Fetch {
    fn id(&self) -> TaskId {
        let mut id = self.params.task_id(Self::NAME);
        id.params
            .insert("series".to_string(), self.params.series.clone());
        id
    }

    fn outputs(&self) -> Vec<Artifact> {
        vec![Artifact::file(self.params.layout.archive())]
    }

    fn run(&self, ctx: &Context, _inputs: &Inputs) -> TaskResult<()> {
        let layout = &self.params.layout;
        let url = &self.params.listing_url;

        fs::create_dir_all(layout.data_dir()).map_err(|e| TaskError::io(layout.data_dir(), e))?;

        let listing = self.params.remote.listing(url)?;
        let link = find_link(&listing, &self.params.link_pattern, url).ok_or_else(|| {
            TaskError::LinkNotFound {
                url: url.clone(),
                pattern: self.params.link_pattern.clone(),
            }
        })?;

        let partial = layout.archive_partial();
        info!(parent: &ctx.span, link = %link, dest = %partial.display(), "downloading archive");
        self.params.remote.download(&link, &partial)?;

        let archive = layout.archive();
        fs::rename(&partial, &archive).map_err(|e| TaskError::io(&archive, e))?;
        info!(parent: &ctx.span, path = %archive.display(), "archive downloaded");
        Ok(())
    }
}
