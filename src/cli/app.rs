//! Main CLI application

use crate::cli::logging;
use crate::config::{load_settings, validate_settings, Settings};
use crate::deploy::{self, info, status, teardown, Workspace};
use crate::error::DeployError;
use crate::runner::{Context, Verbosity};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("cfdock")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Stand up a local multi-node Cloud Foundry on Docker with BOSH")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to cfdock.yml settings file")
                .global(true),
        )
        .arg(
            Arg::new("workspace")
                .short('w')
                .long("workspace")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Directory for state, credentials and generated files")
                .global(true),
        )
        .arg(
            Arg::new("yes")
                .short('y')
                .long("yes")
                .help("Answer yes to confirmation prompts")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("full").about("Deploy the director, then Cloud Foundry"))
        .subcommand(
            Command::new("director")
                .about("Create the BOSH director and prepare it for deployments"),
        )
        .subcommand(
            Command::new("cf").about("Deploy Cloud Foundry onto an existing director and log in"),
        )
        .subcommand(
            Command::new("destroy")
                .about("Delete the deployment, the director, the network and generated files"),
        )
        .subcommand(Command::new("status").about("Show what is deployed and reachable"))
        .subcommand(Command::new("info").about("Print connection details"))
        .subcommand(
            Command::new("env").about("Print shell exports for the director (eval \"$(cfdock env)\")"),
        )
        .subcommand(Command::new("config").about("Print the effective settings as YAML"))
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .value_name("SHELL")
                        .required(true)
                        .value_parser(value_parser!(Shell)),
                ),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Load, validate and resolve everything a subcommand needs
fn build_context(matches: &ArgMatches, verbosity: Verbosity) -> Result<Context, DeployError> {
    let file = matches.get_one::<PathBuf>("file");
    let (settings, settings_path) = load_settings(file.map(PathBuf::as_path))?;
    validate_settings(&settings)?;

    let workspace = Workspace::resolve(
        &settings,
        matches.get_one::<PathBuf>("workspace").map(PathBuf::as_path),
    )?;

    let ctx = Context::new(settings, workspace)
        .with_verbosity(verbosity)
        .with_assume_yes(matches.get_flag("yes"));

    if let Some(path) = settings_path {
        ctx.print_debug(&format!("Using settings from {}", path.display()));
    }
    Ok(ctx)
}

/// Effective settings, with the resolved workspace filled in
fn effective_settings(ctx: &Context) -> Settings {
    let mut settings = ctx.settings.clone();
    settings.workspace = Some(ctx.workspace.root().display().to_string());
    settings
}

/// Run the CLI with the process arguments
pub fn run() -> Result<(), DeployError> {
    run_from(std::env::args_os())
}

/// Run the CLI with explicit arguments
pub fn run_from<I, T>(args: I) -> Result<(), DeployError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command().get_matches_from(args);
    let verbosity = get_verbosity(&matches);

    if let Err(e) = logging::init(verbosity) {
        eprintln!("warning: {:#}", e);
    }

    let (name, _) = match matches.subcommand() {
        Some(sub) => sub,
        None => {
            build_command().print_help()?;
            println!();
            return Ok(());
        }
    };

    if let Some(("completions", sub)) = matches.subcommand() {
        if let Some(shell) = sub.get_one::<Shell>("shell") {
            clap_complete::generate(*shell, &mut build_command(), "cfdock", &mut io::stdout());
        }
        return Ok(());
    }

    let mut ctx = build_context(&matches, verbosity)?;

    match name {
        "full" => deploy::full_pipeline().execute(&mut ctx),
        "director" => deploy::director_pipeline().execute(&mut ctx),
        "cf" => deploy::cf_pipeline().execute(&mut ctx),
        "destroy" => teardown::destroy(&mut ctx),
        "status" => status::report(&mut ctx),
        "info" => {
            print!("{}", info::connection_info(&ctx)?);
            Ok(())
        }
        "env" => {
            print!("{}", info::env_exports(&ctx)?);
            Ok(())
        }
        "config" => {
            print!("{}", serde_yaml::to_string(&effective_settings(&ctx))?);
            Ok(())
        }
        other => unreachable!("unhandled subcommand {}", other),
    }
}
