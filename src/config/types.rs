//! Core settings types
//!
//! This module defines the data structures that represent a cfdock.yml settings file.
//! Every field has a default, so an empty file (or no file at all) is valid.

use serde::{Deserialize, Serialize};

/// Default git URL for the BOSH director manifests
pub const BOSH_DEPLOYMENT_URL: &str = "https://github.com/cloudfoundry/bosh-deployment.git";

/// Default git URL for the Cloud Foundry manifests
pub const CF_DEPLOYMENT_URL: &str = "https://github.com/cloudfoundry/cf-deployment.git";

/// Default stemcell location
pub const STEMCELL_PRIMARY_URL: &str =
    "https://bosh.io/d/stemcells/bosh-warden-boshlite-ubuntu-jammy-go_agent";

/// Stemcell location used when the primary one cannot be uploaded
pub const STEMCELL_FALLBACK_URL: &str = "https://storage.googleapis.com/bosh-core-stemcells/1.423/bosh-stemcell-1.423-warden-boshlite-ubuntu-jammy-go_agent.tgz";

/// Top-level settings structure
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Workspace directory holding state, credentials and generated files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,

    /// Host IP address (detected when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,

    /// Platform system domain (derived from the host IP when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_domain: Option<String>,

    pub network: NetworkSettings,
    pub director: DirectorSettings,
    pub cf: CfSettings,
    pub stemcell: StemcellSettings,
    pub readiness: ReadinessSettings,
    pub tools: ToolPaths,
}

/// Docker network the director and its VMs live on
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct NetworkSettings {
    pub name: String,
    pub subnet: String,
    pub gateway: String,
    pub director_ip: String,
    pub reserved: Vec<String>,
    #[serde(rename = "static")]
    pub static_ips: Vec<String>,
    pub dns: Vec<String>,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        NetworkSettings {
            name: "cfdock".to_string(),
            subnet: "10.245.0.0/16".to_string(),
            gateway: "10.245.0.1".to_string(),
            director_ip: "10.245.0.10".to_string(),
            reserved: vec!["10.245.0.2-10.245.0.10".to_string()],
            static_ips: vec!["10.245.0.11-10.245.0.100".to_string()],
            dns: vec!["8.8.8.8".to_string()],
        }
    }
}

/// BOSH director settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct DirectorSettings {
    pub name: String,
    pub repo_url: String,

    /// Checkout of bosh-deployment (defaults to `<workspace>/bosh-deployment`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_dir: Option<String>,

    /// Docker endpoint handed to the CPI (defaults to DOCKER_HOST or the local socket)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_host: Option<String>,

    /// Extra ops files, relative to the bosh-deployment checkout
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ops_files: Vec<String>,
}

impl Default for DirectorSettings {
    fn default() -> Self {
        DirectorSettings {
            name: "docker".to_string(),
            repo_url: BOSH_DEPLOYMENT_URL.to_string(),
            repo_dir: None,
            docker_host: None,
            ops_files: Vec::new(),
        }
    }
}

/// Cloud Foundry deployment settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct CfSettings {
    pub deployment: String,
    pub repo_url: String,

    /// Checkout of cf-deployment (defaults to `<workspace>/cf-deployment`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_dir: Option<String>,

    /// Ops files, relative to the cf-deployment checkout
    pub ops_files: Vec<String>,

    pub admin_user: String,
    pub org: String,
    pub space: String,
    pub skip_ssl_validation: bool,
}

impl Default for CfSettings {
    fn default() -> Self {
        CfSettings {
            deployment: "cf".to_string(),
            repo_url: CF_DEPLOYMENT_URL.to_string(),
            repo_dir: None,
            ops_files: vec![
                "operations/bosh-lite.yml".to_string(),
                "operations/use-compiled-releases.yml".to_string(),
            ],
            admin_user: "admin".to_string(),
            org: "system".to_string(),
            space: "dev".to_string(),
            skip_ssl_validation: true,
        }
    }
}

/// Stemcell sources
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct StemcellSettings {
    pub primary_url: String,
    pub fallback_url: String,

    /// Directory (relative to the workspace) searched for cached `*.tgz` stemcells
    pub cache_dir: String,
}

impl Default for StemcellSettings {
    fn default() -> Self {
        StemcellSettings {
            primary_url: STEMCELL_PRIMARY_URL.to_string(),
            fallback_url: STEMCELL_FALLBACK_URL.to_string(),
            cache_dir: "stemcells".to_string(),
        }
    }
}

/// Director readiness polling
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReadinessSettings {
    pub attempts: u32,
    pub interval_secs: u64,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        ReadinessSettings {
            attempts: 30,
            interval_secs: 10,
        }
    }
}

/// Program names or paths of the external tools
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ToolPaths {
    pub bosh: String,
    pub cf: String,
    pub docker: String,
    pub git: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        ToolPaths {
            bosh: "bosh".to_string(),
            cf: "cf".to_string(),
            docker: "docker".to_string(),
            git: "git".to_string(),
        }
    }
}

/// External tools a pipeline may require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Bosh,
    Cf,
    Docker,
    Git,
}

impl Tool {
    /// Name used in messages and in the `tools` section
    pub fn name(self) -> &'static str {
        match self {
            Tool::Bosh => "bosh",
            Tool::Cf => "cf",
            Tool::Docker => "docker",
            Tool::Git => "git",
        }
    }
}

impl ToolPaths {
    /// Configured program for a tool
    pub fn program(&self, tool: Tool) -> &str {
        match tool {
            Tool::Bosh => &self.bosh,
            Tool::Cf => &self.cf,
            Tool::Docker => &self.docker,
            Tool::Git => &self.git,
        }
    }
}
