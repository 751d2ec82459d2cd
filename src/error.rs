//! Error types for cfdock

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cfdock operations
pub type Result<T> = std::result::Result<T, DeployError>;

/// Main error type for cfdock
#[derive(Error, Debug)]
pub enum DeployError {
    /// Settings-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// External command and pipeline errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Template rendering errors
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DeployError {
    /// Process exit code for this error.
    ///
    /// A failed external command passes its own exit code through.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::Execution(ExecutionError::CommandFailed {
                code: Some(code), ..
            }) if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Settings parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read settings file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    #[error("Required tool '{0}' was not found (install it or set tools.{0} in cfdock.yml)")]
    MissingTool(String),

    #[error("Cannot determine a workspace directory; pass --workspace or set CFDOCK_WORKSPACE")]
    NoWorkspace,
}

/// External command and pipeline errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("'{program}' failed with exit code {code:?}")]
    CommandFailed { program: String, code: Option<i32> },

    #[error("Failed to start '{program}': {error}")]
    Spawn { program: String, error: String },

    #[error("{what} not ready after {attempts} attempts")]
    NotReady { what: String, attempts: u32 },

    #[error("Missing {0}; run `cfdock director` first")]
    MissingState(PathBuf),

    #[error("Credential '{key}' not found in {path}")]
    MissingCredential { key: String, path: PathBuf },

    #[error("No stemcell could be uploaded (tried: {0})")]
    StemcellUnavailable(String),

    #[error("Environment check failed: {0}")]
    Environment(String),

    #[error("Aborted by user")]
    Aborted,
}

/// Template rendering errors
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Rendered {name} is not valid YAML: {error}")]
    MalformedYaml { name: String, error: String },
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for template operations
pub type TemplateResult<T> = std::result::Result<T, TemplateError>;
