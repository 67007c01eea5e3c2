//! Configuration parsing and validation
//!
//! This module handles parsing of geopipe.yml configuration files,
//! environment and command-line overrides, and validation.

pub mod interpolate;
pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use interpolate::*;
pub use parse::*;
pub use schema::*;
pub use types::*;
