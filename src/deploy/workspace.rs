//! Workspace layout and state artifacts
//!
//! All state lives as flat files under one directory. The BOSH CLI writes
//! the director state and credentials; cfdock writes the rest.

use crate::config::Settings;
use crate::error::{ConfigError, ExecutionError, Result};
use crate::runner::interpolate;
use directories::ProjectDirs;
use serde_yaml::Value;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const STATE_FILE: &str = "state.json";
const CREDS_FILE: &str = "creds.yml";
const CA_CERT_FILE: &str = "director-ca.crt";
const CLOUD_CONFIG_FILE: &str = "cloud-config.yml";
const ENV_FILE: &str = "bosh-env.sh";
const CF_VARS_FILE: &str = "cf-vars.yml";
const INFO_FILE: &str = "connection-info.txt";

/// Credentials needed to talk to the director
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorCredentials {
    pub client: String,
    pub client_secret: String,
    pub ca_cert: String,
}

/// Directory holding state and generated files
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    /// Pick the workspace: CLI flag, then settings, then the platform data dir
    ///
    /// Relative paths are resolved against the current directory.
    pub fn resolve(settings: &Settings, cli_override: Option<&Path>) -> Result<Self> {
        let root = match (cli_override, &settings.workspace) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(configured)) => PathBuf::from(interpolate(configured)),
            (None, None) => ProjectDirs::from("", "", "cfdock")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or(ConfigError::NoWorkspace)?,
        };

        let root = if root.is_relative() {
            env::current_dir()?.join(root)
        } else {
            root
        };

        Ok(Workspace { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the workspace directory if needed
    pub fn ensure(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    pub fn state_file(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    pub fn creds_file(&self) -> PathBuf {
        self.root.join(CREDS_FILE)
    }

    pub fn ca_cert_file(&self) -> PathBuf {
        self.root.join(CA_CERT_FILE)
    }

    pub fn cloud_config_file(&self) -> PathBuf {
        self.root.join(CLOUD_CONFIG_FILE)
    }

    pub fn env_file(&self) -> PathBuf {
        self.root.join(ENV_FILE)
    }

    pub fn cf_vars_file(&self) -> PathBuf {
        self.root.join(CF_VARS_FILE)
    }

    pub fn info_file(&self) -> PathBuf {
        self.root.join(INFO_FILE)
    }

    /// Directory searched for cached stemcell tarballs
    pub fn stemcell_dir(&self, settings: &Settings) -> PathBuf {
        self.root.join(&settings.stemcell.cache_dir)
    }

    /// Checkout of bosh-deployment
    pub fn bosh_deployment_dir(&self, settings: &Settings) -> PathBuf {
        self.repo_dir(settings.director.repo_dir.as_deref(), "bosh-deployment")
    }

    /// Checkout of cf-deployment
    pub fn cf_deployment_dir(&self, settings: &Settings) -> PathBuf {
        self.repo_dir(settings.cf.repo_dir.as_deref(), "cf-deployment")
    }

    fn repo_dir(&self, configured: Option<&str>, default_name: &str) -> PathBuf {
        match configured {
            Some(dir) => self.root.join(interpolate(dir)),
            None => self.root.join(default_name),
        }
    }

    /// Labelled artifacts, for status output
    pub fn artifacts(&self) -> Vec<(&'static str, PathBuf)> {
        vec![
            ("director state", self.state_file()),
            ("director credentials", self.creds_file()),
            ("director CA certificate", self.ca_cert_file()),
            ("cloud config", self.cloud_config_file()),
            ("environment file", self.env_file()),
            ("platform credentials", self.cf_vars_file()),
            ("connection info", self.info_file()),
        ]
    }

    /// Remove every generated artifact; repos and cached stemcells stay
    pub fn remove_generated(&self) -> io::Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for (_, path) in self.artifacts() {
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "removed");
                    removed.push(path);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }

    /// Write a generated file
    pub fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file");
        Ok(())
    }

    pub fn has_director_state(&self) -> bool {
        self.state_file().is_file()
    }

    /// Fail unless the director state exists
    pub fn require_director_state(&self) -> Result<()> {
        if self.has_director_state() {
            Ok(())
        } else {
            Err(ExecutionError::MissingState(self.state_file()).into())
        }
    }

    /// Read director credentials from the vars store
    pub fn director_credentials(&self) -> Result<DirectorCredentials> {
        let path = self.creds_file();
        let creds = read_yaml(&path)?;

        Ok(DirectorCredentials {
            client: "admin".to_string(),
            client_secret: lookup(&creds, "admin_password", &path)?,
            ca_cert: lookup(&creds, "director_ssl.ca", &path)?,
        })
    }

    /// Read the platform admin password from the platform vars store
    pub fn cf_admin_password(&self) -> Result<String> {
        let path = self.cf_vars_file();
        let vars = read_yaml(&path)?;
        lookup(&vars, "cf_admin_password", &path)
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ExecutionError::MissingState(path.to_path_buf()).into())
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_yaml::from_str(&contents)?)
}

/// Look up a dotted key (`director_ssl.ca`) holding a string
fn lookup(doc: &Value, dotted: &str, path: &Path) -> Result<String> {
    dotted
        .split('.')
        .try_fold(doc, |node, key| node.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ExecutionError::MissingCredential {
                key: dotted.to_string(),
                path: path.to_path_buf(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeployError;
    use tempfile::TempDir;

    const CREDS: &str = r#"
admin_password: s3cret
director_ssl:
  ca: |
    -----BEGIN CERTIFICATE-----
    MIIB
    -----END CERTIFICATE-----
  certificate: ignored
"#;

    #[test]
    fn test_resolve_prefers_cli_override() {
        let settings = Settings {
            workspace: Some("/from/settings".to_string()),
            ..Settings::default()
        };
        let ws = Workspace::resolve(&settings, Some(Path::new("/from/cli"))).unwrap();
        assert_eq!(ws.root(), Path::new("/from/cli"));

        let ws = Workspace::resolve(&settings, None).unwrap();
        assert_eq!(ws.root(), Path::new("/from/settings"));
    }

    #[test]
    fn test_resolve_makes_relative_paths_absolute() {
        let settings = Settings {
            workspace: Some("state-dir".to_string()),
            ..Settings::default()
        };
        let ws = Workspace::resolve(&settings, None).unwrap();
        assert!(ws.root().is_absolute());
        assert!(ws.root().ends_with("state-dir"));
    }

    #[test]
    fn test_repo_dirs() {
        let ws = Workspace::new("/ws");
        let mut settings = Settings::default();
        assert_eq!(
            ws.bosh_deployment_dir(&settings),
            PathBuf::from("/ws/bosh-deployment")
        );

        settings.cf.repo_dir = Some("/src/cf-deployment".to_string());
        assert_eq!(
            ws.cf_deployment_dir(&settings),
            PathBuf::from("/src/cf-deployment")
        );
    }

    #[test]
    fn test_director_credentials() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path());
        fs::write(ws.creds_file(), CREDS).unwrap();

        let creds = ws.director_credentials().unwrap();
        assert_eq!(creds.client, "admin");
        assert_eq!(creds.client_secret, "s3cret");
        assert!(creds.ca_cert.starts_with("-----BEGIN CERTIFICATE-----"));
    }

    #[test]
    fn test_missing_credential_key() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path());
        fs::write(ws.creds_file(), "admin_password: x\n").unwrap();

        let err = ws.director_credentials().unwrap_err();
        assert!(matches!(
            err,
            DeployError::Execution(ExecutionError::MissingCredential { ref key, .. }) if key == "director_ssl.ca"
        ));
    }

    #[test]
    fn test_missing_creds_file_is_missing_state() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path());
        assert!(matches!(
            ws.cf_admin_password(),
            Err(DeployError::Execution(ExecutionError::MissingState(_)))
        ));
    }

    #[test]
    fn test_remove_generated_keeps_repos() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path());
        let settings = Settings::default();
        fs::write(ws.state_file(), "{}").unwrap();
        fs::write(ws.info_file(), "info").unwrap();
        let repo = ws.bosh_deployment_dir(&settings);
        fs::create_dir_all(&repo).unwrap();

        let removed = ws.remove_generated().unwrap();

        assert_eq!(removed.len(), 2);
        assert!(!ws.state_file().exists());
        assert!(repo.is_dir());
        assert!(ws.remove_generated().unwrap().is_empty());
    }

    #[test]
    fn test_require_director_state() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path());
        assert!(ws.require_director_state().is_err());

        ws.write(&ws.state_file(), "{}").unwrap();
        assert!(ws.require_director_state().is_ok());
    }
}
