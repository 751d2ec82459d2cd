//! Execution context for pipeline runs
//!
//! The context tracks all the state needed while steps run: settings, the
//! workspace, values discovered during environment detection, and output
//! verbosity.

use crate::config::{Settings, Tool};
use crate::deploy::Workspace;
use crate::runner::command::Invocation;
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Execution context that tracks state during a run
pub struct Context {
    /// Effective settings
    pub settings: Settings,

    /// Workspace holding state and generated files
    pub workspace: Workspace,

    /// Verbosity level
    pub verbosity: Verbosity,

    /// Answer yes to confirmation prompts
    pub assume_yes: bool,

    /// Host IP, once detected
    pub host_ip: Option<String>,

    /// System domain, once resolved
    pub system_domain: Option<String>,

    /// `BOSH_*` variables for talking to the director
    director_env: Option<Vec<(String, String)>>,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Context {
    /// Create a new context for the given settings and workspace
    pub fn new(settings: Settings, workspace: Workspace) -> Self {
        Context {
            host_ip: settings.host_ip.clone(),
            system_domain: settings.system_domain.clone(),
            settings,
            workspace,
            verbosity: Verbosity::Normal,
            assume_yes: false,
            director_env: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Context::new(Settings::default(), Workspace::new(std::env::temp_dir()))
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Skip confirmation prompts
    pub fn with_assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    /// Start a call to one of the external tools
    pub fn tool(&self, tool: Tool) -> Invocation {
        Invocation::new(self.settings.tools.program(tool))
    }

    /// Start a bosh call, carrying director credentials when they are known
    pub fn bosh(&self) -> Invocation {
        let inv = self.tool(Tool::Bosh);
        match &self.director_env {
            Some(vars) => inv.envs(vars.iter().cloned()),
            None => inv,
        }
    }

    /// Remember the `BOSH_*` variables for later bosh calls
    pub fn set_director_env(&mut self, vars: Vec<(String, String)>) {
        self.director_env = Some(vars);
    }

    /// Host IP, falling back to loopback when detection has not run
    pub fn host_ip(&self) -> &str {
        self.host_ip.as_deref().unwrap_or("127.0.0.1")
    }

    /// System domain, derived from the host IP unless overridden
    pub fn system_domain(&self) -> String {
        self.system_domain
            .clone()
            .unwrap_or_else(|| format!("{}.nip.io", self.host_ip()))
    }

    /// Ask a yes/no question on stdin
    pub fn confirm(&self, question: &str) -> io::Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let stdin = io::stdin();
        self.confirm_with(question, &mut stdin.lock())
    }

    /// Ask a yes/no question, reading the answer from `input`
    ///
    /// Only `y` or `yes` (any case) count as yes; EOF counts as no.
    pub fn confirm_with<R: BufRead>(&self, question: &str, input: &mut R) -> io::Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }

        print!("{} [y/N] ", question);
        io::stdout().flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        let answer = answer.trim();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "[INFO]".green(), message);
        }
    }

    /// Print warning message
    pub fn print_warn(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "[WARN]".yellow(), message);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "[DEBUG]".dimmed(), message);
        }
    }

    /// Print a command line about to run
    pub fn print_run(&self, command_line: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "[RUN]".cyan(), command_line);
        }
    }

    /// Print pipeline step start message
    pub fn print_step_start(&self, index: usize, total: usize, step: &str) {
        self.print_info(&format!("{} {}", format!("[{}/{}]", index, total).bold(), step));
    }
}
