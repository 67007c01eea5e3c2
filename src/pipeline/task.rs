//! Task abstraction
//!
//! A task is a descriptor: an identity, the upstream tasks it requires, the
//! artifacts it promises, and a run procedure. Descriptors are rebuilt for
//! every resolution and carry no progress state of their own.

use crate::error::{ResolutionResult, TaskResult};
use crate::pipeline::{Artifact, Context};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Identity of a task: its name plus the parameters that determine its outputs.
///
/// Two descriptors with equal ids are the same node of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    pub name: String,
    pub params: BTreeMap<String, String>,
}

impl TaskId {
    pub fn new(name: impl Into<String>, params: BTreeMap<String, String>) -> Self {
        TaskId {
            name: name.into(),
            params,
        }
    }

    /// Build an id from `(key, value)` pairs
    pub fn with_params<K, V>(name: impl Into<String>, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        TaskId::new(
            name,
            params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({})", self.name, params)
    }
}

/// Outputs of a task's direct dependencies, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    entries: Vec<(TaskId, Vec<Artifact>)>,
}

impl Inputs {
    pub fn new(entries: Vec<(TaskId, Vec<Artifact>)>) -> Self {
        Inputs { entries }
    }

    /// Outputs of the dependency with the given task name
    pub fn of(&self, name: &str) -> Option<&[Artifact]> {
        self.entries
            .iter()
            .find(|(id, _)| id.name == name)
            .map(|(_, artifacts)| artifacts.as_slice())
    }

    /// Every input artifact, flattened
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.entries.iter().flat_map(|(_, artifacts)| artifacts.iter())
    }
}

/// A unit of work in the pipeline graph
pub trait Task: Send + Sync {
    /// Name and parameters identifying this node
    fn id(&self) -> TaskId;

    /// Upstream tasks, constructed fresh on each call
    fn requires(&self) -> ResolutionResult<Vec<Arc<dyn Task>>> {
        Ok(Vec::new())
    }

    /// Artifacts this task promises to produce
    fn outputs(&self) -> Vec<Artifact>;

    /// Produce the declared outputs from the dependencies' outputs
    fn run(&self, ctx: &Context, inputs: &Inputs) -> TaskResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_display() {
        let id = TaskId::with_params("Fetch", [("dataset", "GSE68849"), ("data_dir", "data")]);
        assert_eq!(id.to_string(), "Fetch(data_dir=data, dataset=GSE68849)");
    }

    #[test]
    fn test_task_id_equality_ignores_param_order() {
        let a = TaskId::with_params("Extract", [("a", "1"), ("b", "2")]);
        let b = TaskId::with_params("Extract", [("b", "2"), ("a", "1")]);
        assert_eq!(a, b);

        let c = TaskId::with_params("Extract", [("a", "1"), ("b", "3")]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_inputs_lookup() {
        let inputs = Inputs::new(vec![
            (
                TaskId::with_params("Fetch", Vec::<(String, String)>::new()),
                vec![Artifact::file("data/x_RAW")],
            ),
            (
                TaskId::with_params("Other", Vec::<(String, String)>::new()),
                vec![Artifact::file("a"), Artifact::file("b")],
            ),
        ]);

        assert_eq!(
            inputs.of("Fetch").and_then(|a| a.first()),
            Some(&Artifact::file("data/x_RAW"))
        );
        assert_eq!(inputs.of("Other").map(|a| a.len()), Some(2));
        assert!(inputs.of("Missing").is_none());
        assert_eq!(inputs.artifacts().count(), 3);
    }
}
