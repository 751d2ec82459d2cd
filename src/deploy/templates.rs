//! Generated file templates
//!
//! Templates use `${name}` placeholders and are rendered strictly: every
//! placeholder needs a value, and YAML output must parse.

use crate::config::Settings;
use crate::deploy::workspace::DirectorCredentials;
use crate::error::TemplateResult;
use crate::runner::{render, render_yaml, yaml_list, Context};
use std::collections::HashMap;

const CLOUD_CONFIG: &str = r#"azs:
- name: z1
  cloud_properties: {}
- name: z2
  cloud_properties: {}
- name: z3
  cloud_properties: {}

vm_types:
- name: default
  cloud_properties: {}
- name: minimal
  cloud_properties: {}
- name: small
  cloud_properties: {}
- name: small-highmem
  cloud_properties: {}
- name: medium
  cloud_properties: {}
- name: large
  cloud_properties: {}
- name: compilation
  cloud_properties: {}

vm_extensions:
- name: 50GB_ephemeral_disk
- name: 100GB_ephemeral_disk
- name: cf-router-network-properties
- name: cf-tcp-router-network-properties
- name: diego-ssh-proxy-network-properties

disk_types:
- name: default
  disk_size: 1024
- name: 5GB
  disk_size: 5120
- name: 10GB
  disk_size: 10240
- name: 100GB
  disk_size: 102400

networks:
- name: default
  type: manual
  subnets:
  - azs: [z1, z2, z3]
    range: ${subnet}
    gateway: ${gateway}
    dns: ${dns}
    reserved: ${reserved}
    static: ${static}
    cloud_properties:
      name: ${network_name}

compilation:
  workers: 5
  az: z1
  reuse_compilation_vms: true
  vm_type: compilation
  network: default
"#;

const ENV_FILE: &str = r#"# Generated by cfdock. Source this file to target the local director:
#   source ${env_file}
export BOSH_ENVIRONMENT=${director_ip}
export BOSH_CLIENT=${client}
export BOSH_CLIENT_SECRET=${client_secret}
export BOSH_CA_CERT=${ca_cert_file}
export HOST_IP=${host_ip}
export CF_SYSTEM_DOMAIN=${system_domain}
"#;

const INFO_HEADER: &str = r#"Local Cloud Foundry on Docker
=============================

Workspace:        ${workspace}
Host IP:          ${host_ip}
System domain:    ${system_domain}
Docker network:   ${network_name} (${subnet})

BOSH director
-------------
Name:             ${director_name}
Address:          https://${director_ip}:25555
Client:           ${client}
Client secret:    ${client_secret}
CA certificate:   ${ca_cert_file}
Shell setup:      source ${env_file}
"#;

const INFO_PLATFORM: &str = r#"
Cloud Foundry
-------------
Deployment:       ${deployment}
API endpoint:     ${api}
Admin user:       ${admin_user}
Admin password:   ${admin_password}
Org / space:      ${org} / ${space}
Log in with:      cf login -a ${api}${skip_ssl} -u ${admin_user} -p ${admin_password_arg}
"#;

fn vars(pairs: &[(&str, String)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Render the cloud config for the configured network
pub fn cloud_config(settings: &Settings) -> TemplateResult<String> {
    let net = &settings.network;
    let v = vars(&[
        ("subnet", net.subnet.clone()),
        ("gateway", net.gateway.clone()),
        ("dns", yaml_list(&net.dns)),
        ("reserved", yaml_list(&net.reserved)),
        ("static", yaml_list(&net.static_ips)),
        ("network_name", net.name.clone()),
    ]);
    render_yaml("cloud config", CLOUD_CONFIG, &v)
}

/// `BOSH_*` variables for child processes
pub fn director_env(ctx: &Context, creds: &DirectorCredentials) -> Vec<(String, String)> {
    vec![
        (
            "BOSH_ENVIRONMENT".to_string(),
            ctx.settings.network.director_ip.clone(),
        ),
        ("BOSH_CLIENT".to_string(), creds.client.clone()),
        ("BOSH_CLIENT_SECRET".to_string(), creds.client_secret.clone()),
        (
            "BOSH_CA_CERT".to_string(),
            ctx.workspace.ca_cert_file().display().to_string(),
        ),
    ]
}

/// Single-quote a value for POSIX shells
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Render the shell export file
pub fn env_file(ctx: &Context, creds: &DirectorCredentials) -> TemplateResult<String> {
    let ws = &ctx.workspace;
    let v = vars(&[
        ("env_file", ws.env_file().display().to_string()),
        ("director_ip", shell_quote(&ctx.settings.network.director_ip)),
        ("client", shell_quote(&creds.client)),
        ("client_secret", shell_quote(&creds.client_secret)),
        ("ca_cert_file", shell_quote(&ws.ca_cert_file().display().to_string())),
        ("host_ip", shell_quote(ctx.host_ip())),
        ("system_domain", shell_quote(&ctx.system_domain())),
    ]);
    render(ENV_FILE, &v)
}

/// Platform details for the connection info file
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    pub admin_password: String,
}

/// API endpoint of the platform
pub fn api_endpoint(ctx: &Context) -> String {
    format!("https://api.{}", ctx.system_domain())
}

/// Render the human-readable connection info
pub fn connection_info(
    ctx: &Context,
    creds: &DirectorCredentials,
    platform: Option<&PlatformInfo>,
) -> TemplateResult<String> {
    let settings = &ctx.settings;
    let ws = &ctx.workspace;
    let header = vars(&[
        ("workspace", ws.root().display().to_string()),
        ("host_ip", ctx.host_ip().to_string()),
        ("system_domain", ctx.system_domain()),
        ("network_name", settings.network.name.clone()),
        ("subnet", settings.network.subnet.clone()),
        ("director_name", settings.director.name.clone()),
        ("director_ip", settings.network.director_ip.clone()),
        ("client", creds.client.clone()),
        ("client_secret", creds.client_secret.clone()),
        ("ca_cert_file", ws.ca_cert_file().display().to_string()),
        ("env_file", ws.env_file().display().to_string()),
    ]);
    let mut text = render(INFO_HEADER, &header)?;

    if let Some(platform) = platform {
        let skip_ssl = if settings.cf.skip_ssl_validation {
            " --skip-ssl-validation"
        } else {
            ""
        };
        let v = vars(&[
            ("deployment", settings.cf.deployment.clone()),
            ("api", api_endpoint(ctx)),
            ("admin_user", settings.cf.admin_user.clone()),
            ("admin_password", platform.admin_password.clone()),
            ("admin_password_arg", shell_quote(&platform.admin_password)),
            ("org", settings.cf.org.clone()),
            ("space", settings.cf.space.clone()),
            ("skip_ssl", skip_ssl.to_string()),
        ]);
        text.push_str(&render(INFO_PLATFORM, &v)?);
    }

    Ok(text)
}
