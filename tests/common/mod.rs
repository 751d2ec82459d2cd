//! Common test utilities
//!
//! `TestEnv` builds a temporary directory with fake `bosh`, `cf`, `docker`
//! and `git` executables. Each fake appends its argv to a shared log and
//! produces the files the real tool would (state, vars stores, checkouts).

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_BOSH: &str = r#"#!/bin/sh
echo "bosh $*" >> "$CFDOCK_TEST_LOG"
if [ -n "$FAKE_BOSH_FAIL" ] && [ "$1" = "$FAKE_BOSH_FAIL" ]; then
  exit 42
fi
store_arg() {
  prev=""
  for a in "$@"; do
    if [ "$prev" = "$FLAG" ]; then echo "$a"; return; fi
    prev="$a"
  done
}
case " $* " in
  *" create-env "*)
    state=$(FLAG=--state store_arg "$@")
    vars=$(FLAG=--vars-store store_arg "$@")
    echo '{"director_id":"fake"}' > "$state"
    printf 'admin_password: director-secret\ndirector_ssl:\n  ca: |\n    -----BEGIN CERTIFICATE-----\n    FAKE\n    -----END CERTIFICATE-----\n' > "$vars"
    ;;
  *" deploy "*)
    vars=$(FLAG=--vars-store store_arg "$@")
    echo 'cf_admin_password: cf-secret' > "$vars"
    ;;
  *" env "*)
    [ -z "$FAKE_BOSH_ENV_DOWN" ] || exit 1
    [ "$BOSH_CLIENT_SECRET" = "director-secret" ] || exit 1
    ;;
  *" upload-stemcell "*)
    case "$*" in *primary*) exit 1 ;; esac
    ;;
esac
exit 0
"#;

const FAKE_DOCKER: &str = r#"#!/bin/sh
echo "docker $*" >> "$CFDOCK_TEST_LOG"
marker="$CFDOCK_TEST_DIR/network-exists"
case "$1" in
  info) [ -z "$FAKE_DOCKER_DOWN" ] ;;
  network)
    case "$2" in
      inspect) [ -f "$marker" ] ;;
      create) touch "$marker" ;;
      rm) rm -f "$marker" ;;
    esac
    ;;
  ps) echo "fake-vm-1" ;;
esac
"#;

const FAKE_GIT: &str = r#"#!/bin/sh
echo "git $*" >> "$CFDOCK_TEST_LOG"
for a in "$@"; do last="$a"; done
mkdir -p "$last"
"#;

const FAKE_CF: &str = r#"#!/bin/sh
echo "cf $*" >> "$CFDOCK_TEST_LOG"
"#;

/// Temporary environment with fake tools and a settings file
pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub bin: PathBuf,
    pub workspace: PathBuf,
    pub settings: PathBuf,
    pub log: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_extra_settings("")
    }

    /// Build the environment, appending `extra` to the settings file
    pub fn with_extra_settings(extra: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();
        let bin = root.join("bin");
        let workspace = root.join("workspace");
        fs::create_dir_all(&bin).unwrap();

        for (name, script) in [
            ("bosh", FAKE_BOSH),
            ("docker", FAKE_DOCKER),
            ("git", FAKE_GIT),
            ("cf", FAKE_CF),
        ] {
            write_executable(&bin.join(name), script);
        }

        let settings = root.join("cfdock.yml");
        let contents = format!(
            r#"workspace: {workspace}
host-ip: 192.0.2.10
readiness:
  attempts: 3
  interval-secs: 0
stemcell:
  primary-url: https://stemcells.invalid/primary.tgz
  fallback-url: https://stemcells.invalid/fallback.tgz
director:
  docker-host: unix:///var/run/docker.sock
tools:
  bosh: {bin}/bosh
  cf: {bin}/cf
  docker: {bin}/docker
  git: {bin}/git
{extra}"#,
            workspace = workspace.display(),
            bin = bin.display(),
            extra = extra,
        );
        fs::write(&settings, contents).unwrap();

        let log = root.join("calls.log");

        TestEnv {
            _tmp: tmp,
            root,
            bin,
            workspace,
            settings,
            log,
        }
    }

    /// `cfdock -f <settings>` with an isolated environment
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("cfdock").unwrap();
        cmd.current_dir(&self.root)
            .env("CFDOCK_TEST_LOG", &self.log)
            .env("CFDOCK_TEST_DIR", &self.root)
            .env("NO_COLOR", "1")
            .env_remove("HOST_IP")
            .env_remove("SYSTEM_DOMAIN")
            .env_remove("CFDOCK_WORKSPACE")
            .env_remove("RUST_LOG")
            .arg("-f")
            .arg(&self.settings);
        cmd
    }

    /// Logged tool calls, one per line
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Forget previously logged calls
    pub fn clear_calls(&self) {
        let _ = fs::remove_file(&self.log);
    }

    /// Index of the first logged call starting with `prefix`
    pub fn call_index(&self, prefix: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.starts_with(prefix))
    }

    pub fn workspace_file(&self, name: &str) -> PathBuf {
        self.workspace.join(name)
    }
}

fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}
