//! BOSH director lifecycle
//!
//! Bring-up and teardown are single blocking `bosh create-env` /
//! `bosh delete-env` calls; everything else here prepares their inputs or
//! talks to the running director.

use crate::deploy::templates;
use crate::error::{ExecutionError, Result};
use crate::runner::{check, execute, Context, Invocation};
use std::env;
use std::thread;
use std::time::Duration;

const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

/// Ops files applied to bosh.yml, relative to the bosh-deployment checkout
const BASE_OPS_FILES: &[&str] = &["docker/cpi.yml", "jumpbox-user.yml"];
const UNIX_SOCKET_OPS_FILE: &str = "docker/unix-sock.yml";

/// Docker endpoint handed to the CPI
pub fn docker_host(ctx: &Context) -> String {
    ctx.settings
        .director
        .docker_host
        .clone()
        .or_else(|| env::var("DOCKER_HOST").ok().filter(|h| !h.is_empty()))
        .unwrap_or_else(|| DEFAULT_DOCKER_HOST.to_string())
}

/// Build `bosh create-env` or `bosh delete-env` with identical arguments
pub fn env_invocation(ctx: &Context, subcommand: &str) -> Result<Invocation> {
    let settings = &ctx.settings;
    let ws = &ctx.workspace;
    let repo = ws.bosh_deployment_dir(settings);
    let docker_host = docker_host(ctx);

    let mut ops: Vec<&str> = vec![BASE_OPS_FILES[0]];
    if docker_host.starts_with("unix://") {
        ops.push(UNIX_SOCKET_OPS_FILE);
    }
    ops.extend(BASE_OPS_FILES[1..].iter().copied());
    ops.extend(settings.director.ops_files.iter().map(String::as_str));

    let mut inv = ctx
        .tool(crate::config::Tool::Bosh)
        .arg(subcommand)
        .path_arg(&repo.join("bosh.yml"))
        .arg("--state")
        .path_arg(&ws.state_file())
        .arg("--vars-store")
        .path_arg(&ws.creds_file());

    for op in ops {
        inv = inv.arg("-o").path_arg(&repo.join(op));
    }

    let net = &settings.network;
    for (name, value) in [
        ("director_name", settings.director.name.as_str()),
        ("internal_cidr", net.subnet.as_str()),
        ("internal_gw", net.gateway.as_str()),
        ("internal_ip", net.director_ip.as_str()),
        ("docker_host", docker_host.as_str()),
        ("network", net.name.as_str()),
    ] {
        inv = inv.arg("-v").arg(format!("{}={}", name, value));
    }

    Ok(inv)
}

/// Create (or converge) the director
pub fn create_director(ctx: &mut Context) -> Result<()> {
    let inv = env_invocation(ctx, "create-env")?;
    execute(&inv, ctx)?;
    Ok(())
}

/// Delete the director VM and its state
pub fn delete_director(ctx: &Context) -> Result<()> {
    let inv = env_invocation(ctx, "delete-env")?;
    execute(&inv, ctx)?;
    Ok(())
}

/// Load credentials from the workspace and use them for later bosh calls
pub fn load_director_access(ctx: &mut Context) -> Result<()> {
    ctx.workspace.require_director_state()?;
    let creds = ctx.workspace.director_credentials()?;
    let vars = templates::director_env(ctx, &creds);
    ctx.set_director_env(vars);
    Ok(())
}

/// Write the CA certificate and the shell export file, then load access
pub fn write_director_access(ctx: &mut Context) -> Result<()> {
    let creds = ctx.workspace.director_credentials()?;

    let ws = ctx.workspace.clone();
    ws.write(&ws.ca_cert_file(), &creds.ca_cert)?;
    ws.write(&ws.env_file(), &templates::env_file(ctx, &creds)?)?;

    let vars = templates::director_env(ctx, &creds);
    ctx.set_director_env(vars);
    ctx.print_info(&format!("Wrote {}", ws.env_file().display()));
    Ok(())
}

/// Check whether `bosh env` succeeds
pub fn director_reachable(ctx: &Context) -> bool {
    check(&ctx.bosh().arg("env"), ctx)
}

/// Call `probe` until it succeeds, at most `attempts` times
///
/// `sleep` runs between attempts, never after the last one. Returns the
/// attempt number that succeeded.
pub fn poll<P, S>(attempts: u32, mut probe: P, mut sleep: S) -> Option<u32>
where
    P: FnMut(u32) -> bool,
    S: FnMut(),
{
    for attempt in 1..=attempts {
        if probe(attempt) {
            return Some(attempt);
        }
        if attempt < attempts {
            sleep();
        }
    }
    None
}

/// Wait until the director answers `bosh env`
pub fn wait_for_director(ctx: &mut Context) -> Result<()> {
    let attempts = ctx.settings.readiness.attempts;
    let interval = Duration::from_secs(ctx.settings.readiness.interval_secs);
    let ctx = &*ctx;

    let ready = poll(
        attempts,
        |attempt| {
            let ok = director_reachable(ctx);
            if !ok {
                ctx.print_debug(&format!(
                    "Director not ready (attempt {}/{})",
                    attempt, attempts
                ));
            }
            tracing::debug!(attempt, ok, "director readiness");
            ok
        },
        || thread::sleep(interval),
    );

    match ready {
        Some(_) => {
            ctx.print_info("Director is ready");
            Ok(())
        }
        None => Err(ExecutionError::NotReady {
            what: "BOSH director".to_string(),
            attempts,
        }
        .into()),
    }
}

/// Render, write and apply the cloud config
pub fn update_cloud_config(ctx: &mut Context) -> Result<()> {
    let rendered = templates::cloud_config(&ctx.settings)?;
    let path = ctx.workspace.cloud_config_file();
    ctx.workspace.write(&path, &rendered)?;

    let inv = ctx.bosh().args(["-n", "update-cloud-config"]).path_arg(&path);
    execute(&inv, ctx)?;
    Ok(())
}

/// Apply the DNS runtime config shipped with bosh-deployment
pub fn update_runtime_config(ctx: &mut Context) -> Result<()> {
    let repo = ctx.workspace.bosh_deployment_dir(&ctx.settings);
    let inv = ctx
        .bosh()
        .args(["-n", "update-runtime-config"])
        .path_arg(&repo.join("runtime-configs").join("dns.yml"))
        .args(["--name", "dns"]);
    execute(&inv, ctx)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::deploy::Workspace;

    fn ctx() -> Context {
        let mut settings = Settings::default();
        settings.director.docker_host = Some("unix:///var/run/docker.sock".to_string());
        Context::new(settings, Workspace::new("/ws"))
    }

    #[test]
    fn test_create_env_arguments() {
        let inv = env_invocation(&ctx(), "create-env").unwrap();
        let args = inv.arguments().join(" ");

        assert!(args.starts_with("create-env /ws/bosh-deployment/bosh.yml"));
        assert!(args.contains("--state /ws/state.json"));
        assert!(args.contains("--vars-store /ws/creds.yml"));
        assert!(args.contains("-o /ws/bosh-deployment/docker/cpi.yml -o /ws/bosh-deployment/docker/unix-sock.yml"));
        assert!(args.contains("-v internal_ip=10.245.0.10"));
        assert!(args.contains("-v network=cfdock"));
    }

    #[test]
    fn test_delete_env_mirrors_create_env() {
        let ctx = ctx();
        let create = env_invocation(&ctx, "create-env").unwrap();
        let delete = env_invocation(&ctx, "delete-env").unwrap();
        assert_eq!(create.arguments()[1..], delete.arguments()[1..]);
        assert_eq!(delete.arguments()[0], "delete-env");
    }

    #[test]
    fn test_tcp_docker_host_skips_unix_socket_ops() {
        let mut ctx = ctx();
        ctx.settings.director.docker_host = Some("tcp://10.0.0.5:2376".to_string());
        ctx.settings.director.ops_files = vec!["docker/localhost.yml".to_string()];

        let args = env_invocation(&ctx, "create-env").unwrap().arguments().join(" ");
        assert!(!args.contains("unix-sock.yml"));
        assert!(args.contains("-o /ws/bosh-deployment/docker/localhost.yml"));
        assert!(args.contains("-v docker_host=tcp://10.0.0.5:2376"));
    }

    #[test]
    fn test_poll_succeeds_on_later_attempt() {
        let mut sleeps = 0;
        let result = poll(5, |attempt| attempt == 3, || sleeps += 1);
        assert_eq!(result, Some(3));
        assert_eq!(sleeps, 2);
    }

    #[test]
    fn test_poll_gives_up_without_trailing_sleep() {
        let mut probes = 0;
        let mut sleeps = 0;
        let result = poll(
            4,
            |_| {
                probes += 1;
                false
            },
            || sleeps += 1,
        );
        assert_eq!(result, None);
        assert_eq!(probes, 4);
        assert_eq!(sleeps, 3);
    }

    #[test]
    fn test_wait_for_director_not_ready() {
        let mut ctx = ctx().with_verbosity(crate::runner::Verbosity::Silent);
        ctx.settings.tools.bosh = "false".to_string();
        ctx.settings.readiness.attempts = 2;
        ctx.settings.readiness.interval_secs = 0;

        let err = wait_for_director(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("not ready after 2 attempts"));
    }
}
