//! Plan execution
//!
//! Runs a resolved plan in order. Work is demand driven from the target: a
//! task whose outputs are complete is not run, and its ancestors are not
//! consulted. The first failure stops the run; artifacts produced before it
//! stay on disk so the next invocation resumes at the failed task.

use crate::error::{ExecutionError, ExecutionResult};
use crate::pipeline::{is_complete, missing_outputs, Context, Inputs, Plan, TaskId};
use std::fmt;
use tracing::{debug, error, info};

/// What happened to a task during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Skipped,
    Executed,
    Failed,
}

/// Per-task outcomes of one invocation, in plan order
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    outcomes: Vec<(TaskId, TaskOutcome)>,
}

impl RunReport {
    fn record(&mut self, id: TaskId, outcome: TaskOutcome) {
        self.outcomes.push((id, outcome));
    }

    pub fn outcomes(&self) -> &[(TaskId, TaskOutcome)] {
        &self.outcomes
    }

    pub fn outcome(&self, id: &TaskId) -> Option<TaskOutcome> {
        self.outcomes
            .iter()
            .find(|(t, _)| t == id)
            .map(|(_, outcome)| *outcome)
    }

    pub fn executed(&self) -> Vec<&TaskId> {
        self.filter(TaskOutcome::Executed)
    }

    /// The task that stopped the run, if any
    pub fn failed(&self) -> Option<&TaskId> {
        self.filter(TaskOutcome::Failed).into_iter().next()
    }

    pub fn skipped(&self) -> Vec<&TaskId> {
        self.filter(TaskOutcome::Skipped)
    }

    /// True when nothing had to run
    pub fn is_noop(&self) -> bool {
        self.executed().is_empty() && self.failed().is_none()
    }

    fn filter(&self, wanted: TaskOutcome) -> Vec<&TaskId> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == wanted)
            .map(|(id, _)| id)
            .collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, outcome) in &self.outcomes {
            let label = match outcome {
                TaskOutcome::Skipped => "skipped",
                TaskOutcome::Executed => "executed",
                TaskOutcome::Failed => "failed",
            };
            writeln!(f, "{:<9} {}", label, id)?;
        }
        Ok(())
    }
}

/// Completion state of a plan node before anything runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Declared outputs already satisfy the completion check
    Complete,
    /// Will run
    Pending,
    /// Only feeds tasks that are already complete
    NotNeeded,
}

/// Walks a plan, skipping complete tasks and running the rest
pub struct Executor<'a> {
    ctx: &'a Context,
}

impl<'a> Executor<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Executor { ctx }
    }

    /// Classify every node of the plan without running anything
    pub fn inspect(&self, plan: &Plan) -> Vec<NodeState> {
        let nodes = plan.nodes();
        let mut needed = vec![false; nodes.len()];
        let mut states = vec![NodeState::NotNeeded; nodes.len()];

        if let Some(last) = needed.last_mut() {
            *last = true;
        }

        for i in (0..nodes.len()).rev() {
            if !needed[i] {
                continue;
            }
            let node = &nodes[i];
            let complete = is_complete(&node.task.outputs(), self.ctx.policy);
            debug!(parent: &self.ctx.span, task = %node.id, complete, "completion check");

            if complete {
                states[i] = NodeState::Complete;
            } else {
                states[i] = NodeState::Pending;
                for &dep in &node.deps {
                    needed[dep] = true;
                }
            }
        }

        states
    }

    /// Execute the plan, stopping at the first failure
    pub fn execute(&self, plan: &Plan) -> ExecutionResult<RunReport> {
        let span = &self.ctx.span;
        let nodes = plan.nodes();
        let states = self.inspect(plan);
        let mut report = RunReport::default();

        for (node, state) in nodes.iter().zip(states) {
            if state != NodeState::Pending {
                info!(parent: span, task = %node.id, "skipped");
                report.record(node.id.clone(), TaskOutcome::Skipped);
                continue;
            }

            let inputs = Inputs::new(
                node.deps
                    .iter()
                    .map(|&dep| (nodes[dep].id.clone(), nodes[dep].task.outputs()))
                    .collect(),
            );

            info!(parent: span, task = %node.id, "running");
            if let Err(source) = node.task.run(self.ctx, &inputs) {
                error!(parent: span, task = %node.id, error = %source, "failed");
                report.record(node.id.clone(), TaskOutcome::Failed);
                return Err(ExecutionError::TaskFailed {
                    task: node.id.clone(),
                    source,
                    report,
                });
            }

            let missing = missing_outputs(&node.task.outputs(), self.ctx.policy);
            if !missing.is_empty() {
                error!(parent: span, task = %node.id, "declared outputs missing after run");
                report.record(node.id.clone(), TaskOutcome::Failed);
                return Err(ExecutionError::PostconditionViolated {
                    task: node.id.clone(),
                    missing,
                    report,
                });
            }

            info!(parent: span, task = %node.id, "executed");
            report.record(node.id.clone(), TaskOutcome::Executed);
        }

        Ok(report)
    }
}
