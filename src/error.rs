//! Error types for Geopipe

use crate::pipeline::{RunReport, TaskId};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Geopipe operations
pub type Result<T> = std::result::Result<T, GeopipeError>;

/// Main error type for Geopipe
#[derive(Error, Debug)]
pub enum GeopipeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Graph resolution errors (raised before any side effect)
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Variable interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Parameter '{0}' is required but not provided")]
    MissingParameter(String),
}

/// Errors raised while expanding a target into an ordered plan
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("Circular dependency detected: {0}")]
    CycleDetected(String),

    #[error("Cannot construct dependency of {task}: {reason}")]
    UnknownDependency { task: TaskId, reason: String },
}

/// Errors raised while running a resolved plan.
///
/// Each variant carries the report of the run up to and including the
/// failed task.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Task {task} failed")]
    TaskFailed {
        task: TaskId,
        #[source]
        source: TaskError,
        report: RunReport,
    },

    #[error("Task {task} reported success but did not produce: {}", display_paths(.missing))]
    PostconditionViolated {
        task: TaskId,
        missing: Vec<PathBuf>,
        report: RunReport,
    },
}

impl ExecutionError {
    /// Identity of the task that stopped the run
    pub fn task(&self) -> &TaskId {
        match self {
            ExecutionError::TaskFailed { task, .. } => task,
            ExecutionError::PostconditionViolated { task, .. } => task,
        }
    }

    /// Outcomes recorded before the run stopped; the failed task is last
    pub fn report(&self) -> &RunReport {
        match self {
            ExecutionError::TaskFailed { report, .. } => report,
            ExecutionError::PostconditionViolated { report, .. } => report,
        }
    }
}

/// Failures of an individual task's run procedure
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("No link matching '{pattern}' found at {url}")]
    LinkNotFound { url: String, pattern: String },

    #[error("Transfer of {url} failed: {reason}")]
    Transfer { url: String, reason: String },

    #[error("Corrupt archive {}: {reason}", .path.display())]
    CorruptArchive { path: PathBuf, reason: String },

    #[error("Malformed input {}: {reason}", .path.display())]
    MalformedInput { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TaskError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TaskError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Recursive interpolation detected")]
    RecursiveInterpolation,
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for plan resolution
pub type ResolutionResult<T> = std::result::Result<T, ResolutionError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for task run procedures
pub type TaskResult<T> = std::result::Result<T, TaskError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
