//! External command execution
//!
//! Every call to bosh, cf, docker or git goes through an [`Invocation`].
//! Commands run synchronously; stdio is inherited for long-running calls
//! and captured or discarded for probes.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::context::{Context, Verbosity};
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};

const REDACTED: &str = "<redacted>";

/// A single external program call
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    /// Indices into `args` that must not be printed
    secret: Vec<usize>,
    envs: Vec<(String, String)>,
    quiet: bool,
}

impl Invocation {
    /// Start building a call to `program`
    pub fn new(program: impl Into<String>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            secret: Vec::new(),
            envs: Vec::new(),
            quiet: false,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append an argument that is shown as `<redacted>` when printed
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    /// Append a path argument
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.display().to_string())
    }

    /// Set environment variables for the child process
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.envs
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Do not echo the command line before running it
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Command line as printed to the user, with secrets redacted
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        for (i, arg) in self.args.iter().enumerate() {
            if self.secret.contains(&i) {
                parts.push(REDACTED.to_string());
            } else if arg.contains(char::is_whitespace) {
                parts.push(format!("'{}'", arg));
            } else {
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }

    fn build(&self) -> StdCommand {
        let mut command = StdCommand::new(&self.program);
        command.args(&self.args);
        for (key, value) in &self.envs {
            command.env(key, value);
        }
        command
    }

    fn spawn_error(&self, e: std::io::Error) -> ExecutionError {
        ExecutionError::Spawn {
            program: self.program.clone(),
            error: e.to_string(),
        }
    }

    fn failed(&self, code: Option<i32>) -> ExecutionError {
        ExecutionError::CommandFailed {
            program: self.program.clone(),
            code,
        }
    }
}

/// Run a command with inherited stdio; a non-zero exit is an error
pub fn execute(inv: &Invocation, ctx: &Context) -> ExecutionResult<()> {
    if !inv.quiet && ctx.verbosity >= Verbosity::Normal {
        ctx.print_run(&inv.display());
    }
    tracing::debug!(program = %inv.program, args = ?redacted_args(inv), "execute");

    let mut command = inv.build();
    command.stdin(Stdio::inherit());
    if ctx.verbosity == Verbosity::Silent {
        command.stdout(Stdio::null());
    } else {
        command.stdout(Stdio::inherit());
    }
    command.stderr(Stdio::inherit());

    let status = command.status().map_err(|e| inv.spawn_error(e))?;

    if !status.success() {
        tracing::debug!(program = %inv.program, code = ?status.code(), "command failed");
        return Err(inv.failed(status.code()));
    }

    Ok(())
}

/// Run a command and return its trimmed stdout; a non-zero exit is an error
pub fn capture(inv: &Invocation, ctx: &Context) -> ExecutionResult<String> {
    ctx.print_debug(&format!("Capturing: {}", inv.display()));
    tracing::debug!(program = %inv.program, args = ?redacted_args(inv), "capture");

    let mut command = inv.build();
    command.stdin(Stdio::null());
    command.stderr(Stdio::piped());

    let output = command.output().map_err(|e| inv.spawn_error(e))?;

    if !output.status.success() {
        tracing::debug!(
            program = %inv.program,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "capture failed"
        );
        return Err(inv.failed(output.status.code()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Check whether a command succeeds, discarding its output
///
/// A program that cannot be started counts as failure.
pub fn check(inv: &Invocation, ctx: &Context) -> bool {
    ctx.print_debug(&format!("Checking: {}", inv.display()));
    tracing::debug!(program = %inv.program, args = ?redacted_args(inv), "check");

    let mut command = inv.build();
    command.stdin(Stdio::null());
    command.stdout(Stdio::null());
    command.stderr(Stdio::null());

    match command.status() {
        Ok(status) => status.success(),
        Err(e) => {
            tracing::debug!(program = %inv.program, error = %e, "check could not start");
            false
        }
    }
}

fn redacted_args(inv: &Invocation) -> Vec<&str> {
    inv.args
        .iter()
        .enumerate()
        .map(|(i, a)| {
            if inv.secret.contains(&i) {
                REDACTED
            } else {
                a.as_str()
            }
        })
        .collect()
}
