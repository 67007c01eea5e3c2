//! CLI interface and argument parsing
//!
//! This module handles command-line interface parsing, log setup and
//! shell completion.

pub mod app;
pub mod logging;

pub use app::*;
pub use logging::init_logging;
