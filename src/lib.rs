//! Geopipe - resumable GEO dataset processing
//!
//! Geopipe downloads a GEO series archive, unpacks it, splits the sample
//! text into tables and cleans up after itself. Each step declares the
//! artifacts it produces, so an interrupted run resumes where it stopped
//! and a finished run does nothing.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod tasks;

// Re-export commonly used types
pub use error::{GeopipeError, Result};

/// Current version of geopipe
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
