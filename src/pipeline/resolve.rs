//! Dependency resolution
//!
//! Expands a target task into a topologically ordered plan, depth first,
//! recording each node after its dependencies.

use crate::error::{ResolutionError, ResolutionResult};
use crate::pipeline::{Task, TaskId};
use std::collections::HashMap;
use std::sync::Arc;

/// A resolved node: the task plus the plan indices of its direct dependencies
#[derive(Clone)]
pub struct PlanNode {
    pub task: Arc<dyn Task>,
    pub id: TaskId,
    pub deps: Vec<usize>,
}

/// Tasks in a valid execution order; the target is last
#[derive(Clone, Default)]
pub struct Plan {
    nodes: Vec<PlanNode>,
}

impl Plan {
    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn target(&self) -> Option<&PlanNode> {
        self.nodes.last()
    }
}

/// Resolve a target into an ordered plan.
///
/// Shared ancestors appear once. A task met again while still on the
/// traversal stack is a cycle.
pub fn resolve(target: Arc<dyn Task>) -> ResolutionResult<Plan> {
    let mut plan = Plan::default();
    let mut index = HashMap::new();
    let mut stack = Vec::new();
    visit(target, &mut plan, &mut index, &mut stack)?;
    Ok(plan)
}

fn visit(
    task: Arc<dyn Task>,
    plan: &mut Plan,
    index: &mut HashMap<TaskId, usize>,
    stack: &mut Vec<TaskId>,
) -> ResolutionResult<usize> {
    let id = task.id();

    if let Some(start) = stack.iter().position(|t| t == &id) {
        let chain = stack[start..]
            .iter()
            .chain(std::iter::once(&id))
            .map(|t| t.to_string())
            .collect::<Vec<_>>();
        return Err(ResolutionError::CycleDetected(chain.join(" -> ")));
    }

    // Already fully processed
    if let Some(&position) = index.get(&id) {
        return Ok(position);
    }

    stack.push(id.clone());

    let mut deps = Vec::new();
    for dependency in task.requires()? {
        let position = visit(dependency, plan, index, stack)?;
        if !deps.contains(&position) {
            deps.push(position);
        }
    }

    stack.pop();

    plan.nodes.push(PlanNode {
        task,
        id: id.clone(),
        deps,
    });
    let position = plan.nodes.len() - 1;
    index.insert(id, position);

    Ok(position)
}
