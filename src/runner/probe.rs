//! Environment probes
//!
//! This module answers questions about the host before any step changes it:
//! which tools exist, whether the Docker daemon answers, and which address
//! the host is reachable on.

use crate::config::Tool;
use crate::error::{ConfigError, ExecutionError, Result};
use crate::runner::command::{capture, check, Invocation};
use crate::runner::Context;
use regex::Regex;
use std::env;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Address used to ask the kernel which source IP it would route from
const ROUTE_PROBE_TARGET: &str = "1.1.1.1";

/// Resolve a program name or path to an executable file
///
/// Names containing a path separator are checked directly; anything else is
/// searched on `PATH`.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
        let path = PathBuf::from(program);
        return is_executable(&path).then_some(path);
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Fail unless every tool resolves to an executable
pub fn require_tools(ctx: &Context, tools: &[Tool]) -> Result<()> {
    for tool in tools {
        let program = ctx.settings.tools.program(*tool);
        match find_executable(program) {
            Some(path) => {
                tracing::debug!(tool = tool.name(), path = %path.display(), "found tool");
            }
            None => return Err(ConfigError::MissingTool(tool.name().to_string()).into()),
        }
    }
    Ok(())
}

/// Check that `docker info` succeeds
pub fn docker_daemon_reachable(ctx: &Context) -> bool {
    check(&ctx.tool(Tool::Docker).arg("info"), ctx)
}

/// Fail unless the Docker daemon answers
pub fn require_docker_daemon(ctx: &Context) -> Result<()> {
    if docker_daemon_reachable(ctx) {
        Ok(())
    } else {
        Err(ExecutionError::Environment("Docker daemon is not reachable".to_string()).into())
    }
}

fn route_src_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bsrc\s+(\d{1,3}(?:\.\d{1,3}){3})\b").expect("valid regex"))
}

/// Extract the `src` address from `ip route get` output
pub fn parse_route_src(output: &str) -> Option<String> {
    route_src_pattern()
        .captures(output)
        .and_then(|caps| caps[1].parse::<Ipv4Addr>().ok())
        .map(|ip| ip.to_string())
}

/// Ask the OS for the host's primary IPv4 address
pub fn query_host_ip(ctx: &Context) -> Option<String> {
    let quiet = |inv: Invocation| capture(&inv.quiet(), ctx).ok();

    if cfg!(target_os = "macos") {
        quiet(Invocation::new("ipconfig").args(["getifaddr", "en0"]))
            .filter(|ip| ip.parse::<Ipv4Addr>().is_ok())
    } else {
        quiet(Invocation::new("ip").args(["-4", "route", "get", ROUTE_PROBE_TARGET]))
            .and_then(|out| parse_route_src(&out))
    }
}

/// Resolve host IP and system domain into the context
///
/// Overrides win; otherwise the OS is asked, and loopback is the last resort.
pub fn detect_host(ctx: &mut Context) {
    detect_host_with(ctx, query_host_ip)
}

/// [`detect_host`] with a custom host IP lookup
pub fn detect_host_with<F>(ctx: &mut Context, query: F)
where
    F: FnOnce(&Context) -> Option<String>,
{
    if ctx.host_ip.is_none() {
        match query(ctx) {
            Some(ip) => {
                tracing::debug!(%ip, "detected host ip");
                ctx.host_ip = Some(ip);
            }
            None => {
                ctx.print_warn("Could not detect the host IP; using 127.0.0.1 (set HOST_IP to override)");
                ctx.host_ip = Some("127.0.0.1".to_string());
            }
        }
    }

    if ctx.system_domain.is_none() {
        ctx.system_domain = Some(ctx.system_domain());
    }

    ctx.print_info(&format!(
        "Host IP {}, system domain {}",
        ctx.host_ip(),
        ctx.system_domain()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Verbosity;

    #[test]
    fn test_parse_route_src_linux() {
        let out = "1.1.1.1 via 192.168.1.1 dev wlp2s0 src 192.168.1.42 uid 1000 \n    cache ";
        assert_eq!(parse_route_src(out), Some("192.168.1.42".to_string()));
    }

    #[test]
    fn test_detect_host_falls_back_to_loopback() {
        let mut ctx = Context::for_tests().with_verbosity(Verbosity::Silent);

        detect_host_with(&mut ctx, |_| None);
        assert_eq!(ctx.host_ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(ctx.system_domain.as_deref(), Some("127.0.0.1.nip.io"));
    }

    #[test]
    fn test_detect_host_uses_lookup() {
        let mut ctx = Context::for_tests().with_verbosity(Verbosity::Silent);

        detect_host_with(&mut ctx, |_| Some("192.168.7.7".to_string()));
        assert_eq!(ctx.host_ip.as_deref(), Some("192.168.7.7"));
        assert_eq!(ctx.system_domain(), "192.168.7.7.nip.io");
    }

    #[test]
    fn test_detect_host_keeps_override() {
        let mut ctx = Context::for_tests().with_verbosity(Verbosity::Silent);
        ctx.host_ip = Some("10.9.9.9".to_string());
        ctx.system_domain = Some("cf.example.test".to_string());

        detect_host_with(&mut ctx, |_| panic!("lookup must not run"));
        assert_eq!(ctx.host_ip(), "10.9.9.9");
        assert_eq!(ctx.system_domain(), "cf.example.test");
    }

    #[test]
    fn test_parse_route_src_missing() {
        assert_eq!(parse_route_src("unreachable"), None);
        assert_eq!(parse_route_src("src 999.1.1.1"), None);
    }

    #[test]
    fn test_find_executable_on_path() {
        assert!(find_executable("sh").is_some());
        assert!(find_executable("cfdock-definitely-not-a-program").is_none());
    }

    #[test]
    fn test_find_executable_by_path() {
        let sh = find_executable("sh").unwrap();
        assert_eq!(find_executable(sh.to_str().unwrap()), Some(sh));
        assert!(find_executable("/nonexistent/dir/bosh").is_none());
    }

    #[test]
    fn test_require_tools_reports_missing_tool() {
        let mut ctx = Context::for_tests();
        ctx.settings.tools.cf = "cfdock-missing-cf".to_string();
        ctx.settings.tools.git = "sh".to_string();

        assert!(require_tools(&ctx, &[Tool::Git]).is_ok());
        let err = require_tools(&ctx, &[Tool::Git, Tool::Cf]).unwrap_err();
        assert!(err.to_string().contains("'cf'"));
    }

    #[test]
    fn test_docker_daemon_unreachable() {
        let mut ctx = Context::for_tests();
        ctx.settings.tools.docker = "false".to_string();
        assert!(!docker_daemon_reachable(&ctx));
        assert!(require_docker_daemon(&ctx).is_err());
    }

    #[test]
    fn test_detect_host_keeps_overrides() {
        let mut ctx = Context::for_tests().with_verbosity(Verbosity::Silent);
        ctx.host_ip = Some("10.9.8.7".to_string());

        detect_host(&mut ctx);

        assert_eq!(ctx.host_ip(), "10.9.8.7");
        assert_eq!(ctx.system_domain.as_deref(), Some("10.9.8.7.nip.io"));
    }
}
