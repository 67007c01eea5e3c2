//! Task orchestration core
//!
//! This module holds the artifact model, the task abstraction, dependency
//! resolution and the executor. Domain tasks live in `crate::tasks`.

pub mod artifact;
pub mod context;
pub mod executor;
pub mod resolve;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use artifact::*;
pub use context::*;
pub use executor::*;
pub use resolve::*;
pub use task::*;
