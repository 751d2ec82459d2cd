//! cfdock - a local Cloud Foundry on Docker
//!
//! cfdock drives the BOSH CLI, the cf CLI and the Docker CLI to stand up a
//! multi-node platform inside containers on one machine. It detects the
//! environment, prepares the Docker network, renders configuration files
//! and runs the long external commands in order.

// Public modules
pub mod cli;
pub mod config;
pub mod deploy;
pub mod error;
pub mod runner;

// Re-export commonly used types
pub use error::{DeployError, Result};

/// Current version of cfdock
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
