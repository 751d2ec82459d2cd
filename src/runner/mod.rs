//! Step execution engine
//!
//! This module handles running external commands, probing the host,
//! rendering templates, and sequencing steps into pipelines.

pub mod command;
pub mod context;
pub mod interpolate;
pub mod probe;
pub mod step;

// Re-export main types
pub use command::{capture, check, execute, Invocation};
pub use context::*;
pub use interpolate::*;
pub use step::*;
