//! CLI interface and argument parsing
//!
//! This module handles command-line interface parsing, help generation,
//! shell completion, and logging setup.

pub mod app;
pub mod logging;

// Re-export main types
pub use app::*;
