//! Execution context for pipeline runs
//!
//! The context is handed explicitly to the executor and to every task, so
//! nothing in the core reaches for process-wide logging or config state.

use crate::pipeline::CompletionPolicy;
use std::env;
use std::path::PathBuf;
use tracing::Span;

/// Execution context shared by reference during one pipeline invocation
pub struct Context {
    /// Directory relative paths are resolved against
    pub working_dir: PathBuf,

    /// Configuration file the run was loaded from, if any
    pub config_path: Option<PathBuf>,

    /// How declared outputs are inspected
    pub policy: CompletionPolicy,

    /// Parent span for every log record of this run
    pub span: Span,

    /// Verbosity level
    pub verbosity: Verbosity,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Verbosity {
    /// Default log filter directive for this level
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Silent => "off",
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_path: None,
            policy: CompletionPolicy::default(),
            span: Span::none(),
            verbosity: Verbosity::Normal,
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the configuration file path
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Set the completion policy
    pub fn with_policy(mut self, policy: CompletionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach the span all records of this run are parented to
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Resolve a possibly relative path against the working directory
    pub fn resolve_path(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
