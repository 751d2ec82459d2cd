//! Settings parsing and validation
//!
//! This module handles parsing of cfdock.yml settings files, environment
//! overrides, and validation of the resulting settings.

pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use types::*;
