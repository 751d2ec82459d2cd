//! Settings file parsing and discovery

use crate::config::types::Settings;
use crate::error::{ConfigError, DeployError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default settings file names to search for
const SETTINGS_FILE_NAMES: &[&str] = &["cfdock.yml", "cfdock.yaml"];

/// Environment variables that override settings values
pub const HOST_IP_VAR: &str = "HOST_IP";
pub const SYSTEM_DOMAIN_VAR: &str = "SYSTEM_DOMAIN";
pub const WORKSPACE_VAR: &str = "CFDOCK_WORKSPACE";

/// Find a settings file by searching the given directory and its parents
pub fn find_settings_file_from(start_dir: PathBuf) -> Option<PathBuf> {
    let mut current_dir = start_dir;

    loop {
        for file_name in SETTINGS_FILE_NAMES {
            let path = current_dir.join(file_name);
            if path.is_file() {
                return Some(path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// Parse a settings file from a path
pub fn parse_settings_file(path: &Path) -> Result<Settings, DeployError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_settings(&contents)
}

/// Parse settings from a string
pub fn parse_settings(yaml: &str) -> Result<Settings, DeployError> {
    // An empty file deserializes to unit, not to a mapping
    if yaml.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings = serde_yaml::from_str(yaml)?;
    Ok(settings)
}

/// Apply environment overrides on top of file settings
///
/// `lookup` is normally `std::env::var`; empty values are ignored.
pub fn apply_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(ip) = get(HOST_IP_VAR) {
        settings.host_ip = Some(ip);
    }
    if let Some(domain) = get(SYSTEM_DOMAIN_VAR) {
        settings.system_domain = Some(domain);
    }
    if let Some(workspace) = get(WORKSPACE_VAR) {
        settings.workspace = Some(workspace);
    }
}

/// Load `.env` from the settings file directory, or the current directory
///
/// Variables that are already set are never overridden.
pub fn load_dotenv(settings_path: Option<&Path>) -> Option<PathBuf> {
    let dir = match settings_path.and_then(|p| p.parent()) {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => env::current_dir().ok()?,
    };
    let dotenv = dir.join(".env");
    if !dotenv.is_file() {
        return None;
    }

    match dotenvy::from_path(&dotenv) {
        Ok(()) => {
            tracing::debug!(path = %dotenv.display(), "loaded .env");
            Some(dotenv)
        }
        Err(e) => {
            tracing::warn!(path = %dotenv.display(), error = %e, "ignoring unreadable .env");
            None
        }
    }
}

/// Load settings: explicit file, else discovered file, else defaults.
/// Environment overrides are applied last.
pub fn load_settings(explicit: Option<&Path>) -> Result<(Settings, Option<PathBuf>), DeployError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => env::current_dir().ok().and_then(find_settings_file_from),
    };

    load_dotenv(path.as_deref());

    let mut settings = match &path {
        Some(p) => {
            tracing::debug!(path = %p.display(), "reading settings");
            parse_settings_file(p)?
        }
        None => Settings::default(),
    };

    apply_overrides(&mut settings, |key| env::var(key).ok());

    Ok((settings, path))
}
