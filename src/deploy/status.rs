//! Environment status report
//!
//! Status is best-effort: nothing being down is an error here.

use crate::deploy::{director, network};
use crate::error::Result;
use crate::runner::{execute, Context};
use colored::Colorize;

/// Director state as seen from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorState {
    NotDeployed,
    Unreachable,
    Reachable,
}

impl DirectorState {
    fn label(self) -> String {
        match self {
            DirectorState::NotDeployed => "not deployed".dimmed().to_string(),
            DirectorState::Unreachable => "unreachable".red().to_string(),
            DirectorState::Reachable => "reachable".green().to_string(),
        }
    }
}

/// Probe the director
pub fn director_state(ctx: &mut Context) -> DirectorState {
    if !ctx.workspace.has_director_state() {
        return DirectorState::NotDeployed;
    }
    if let Err(e) = director::load_director_access(ctx) {
        tracing::debug!(error = %e, "director credentials unavailable");
        return DirectorState::Unreachable;
    }
    if director::director_reachable(ctx) {
        DirectorState::Reachable
    } else {
        DirectorState::Unreachable
    }
}

fn presence(present: bool) -> String {
    if present {
        "present".green().to_string()
    } else {
        "missing".dimmed().to_string()
    }
}

/// Print the status report to stdout
pub fn report(ctx: &mut Context) -> Result<()> {
    println!("Workspace: {}", ctx.workspace.root().display());
    for (label, path) in ctx.workspace.artifacts() {
        println!("  {:<24} {}", label, presence(path.is_file()));
    }

    let net = ctx.settings.network.name.clone();
    let net_present = network::network_exists(ctx);
    println!("Docker network '{}': {}", net, presence(net_present));
    if net_present {
        let containers = network::attached_containers(ctx);
        println!("  {} container(s) attached", containers.len());
    }

    let state = director_state(ctx);
    println!(
        "Director {}: {}",
        ctx.settings.network.director_ip,
        state.label()
    );

    if state == DirectorState::Reachable {
        if let Err(e) = execute(&ctx.bosh().arg("deployments"), ctx) {
            ctx.print_warn(&format!("Could not list deployments: {}", e));
        }
    }

    Ok(())
}
