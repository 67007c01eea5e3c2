//! In-memory task graphs for unit tests

use crate::error::{ResolutionError, ResolutionResult, TaskError, TaskResult};
use crate::pipeline::{Artifact, Context, Inputs, Task, TaskId};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Edges keyed by node key; a key `name@v` carries the parameter `v`
pub struct Graph {
    edges: HashMap<String, Vec<String>>,
    out_dir: Option<PathBuf>,
    runs: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    lying: Mutex<HashSet<String>>,
}

impl Graph {
    /// Dependencies are given comma separated
    pub fn new(edges: &[(&str, &str)]) -> Arc<Self> {
        Self::build(edges, None)
    }

    /// A graph whose nodes write `<key>.out` under `dir`
    pub fn in_dir(edges: &[(&str, &str)], dir: PathBuf) -> Arc<Self> {
        Self::build(edges, Some(dir))
    }

    fn build(edges: &[(&str, &str)], out_dir: Option<PathBuf>) -> Arc<Self> {
        let edges = edges
            .iter()
            .map(|(key, deps)| {
                let deps = deps
                    .split(',')
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .collect();
                (key.to_string(), deps)
            })
            .collect();
        Arc::new(Graph {
            edges,
            out_dir,
            runs: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            lying: Mutex::new(HashSet::new()),
        })
    }

    pub fn id(&self, key: &str) -> TaskId {
        match key.split_once('@') {
            Some((name, v)) => TaskId::with_params(name, [("v", v)]),
            None => TaskId::with_params(key, Vec::<(String, String)>::new()),
        }
    }

    pub fn output(&self, key: &str) -> Option<PathBuf> {
        self.out_dir.as_ref().map(|d| d.join(format!("{}.out", key)))
    }

    /// Make a node's run procedure fail
    pub fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }

    /// Make a node report success without writing its output
    pub fn lie(&self, key: &str) {
        self.lying.lock().unwrap().insert(key.to_string());
    }

    /// Keys of the nodes whose run procedure was invoked, in order
    pub fn runs(&self) -> Vec<String> {
        self.runs.lock().unwrap().clone()
    }

    pub fn clear_runs(&self) {
        self.runs.lock().unwrap().clear();
    }
}

pub struct FakeTask {
    key: String,
    graph: Arc<Graph>,
}

impl FakeTask {
    pub fn root(graph: &Arc<Graph>, key: &str) -> Arc<dyn Task> {
        Arc::new(FakeTask {
            key: key.to_string(),
            graph: Arc::clone(graph),
        })
    }
}

impl Task for FakeTask {
    fn id(&self) -> TaskId {
        self.graph.id(&self.key)
    }

    fn requires(&self) -> ResolutionResult<Vec<Arc<dyn Task>>> {
        let deps = self.graph.edges.get(&self.key).cloned().unwrap_or_default();
        deps.iter()
            .map(|dep| {
                if self.graph.edges.contains_key(dep) {
                    Ok(FakeTask::root(&self.graph, dep))
                } else {
                    Err(ResolutionError::UnknownDependency {
                        task: self.id(),
                        reason: format!("no task named '{}'", dep),
                    })
                }
            })
            .collect()
    }

    fn outputs(&self) -> Vec<Artifact> {
        self.graph
            .output(&self.key)
            .map(Artifact::file)
            .into_iter()
            .collect()
    }

    fn run(&self, _ctx: &Context, inputs: &Inputs) -> TaskResult<()> {
        self.graph.runs.lock().unwrap().push(self.key.clone());

        for input in inputs.artifacts() {
            if !input.exists() {
                return Err(TaskError::MalformedInput {
                    path: input.path().to_path_buf(),
                    reason: "input missing".to_string(),
                });
            }
        }

        if self.graph.failing.lock().unwrap().contains(&self.key) {
            return Err(TaskError::MalformedInput {
                path: PathBuf::from(&self.key),
                reason: "configured to fail".to_string(),
            });
        }
        if self.graph.lying.lock().unwrap().contains(&self.key) {
            return Ok(());
        }

        for output in self.outputs() {
            fs::write(output.path(), &self.key).map_err(|e| TaskError::io(output.path(), e))?;
        }
        Ok(())
    }
}
