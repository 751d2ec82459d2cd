//! Environment teardown

use crate::config::Tool;
use crate::deploy::{cloudfoundry, director, network};
use crate::error::{ExecutionError, Result};
use crate::runner::{probe, Context};

/// Tear everything down after confirmation
///
/// Order: platform deployment (best effort), director, network, generated
/// files. Cloned repositories and cached stemcells are kept.
pub fn destroy(ctx: &mut Context) -> Result<()> {
    let question = format!(
        "Destroy the '{}' deployment, the BOSH director and network '{}' and delete state in {}?",
        ctx.settings.cf.deployment,
        ctx.settings.network.name,
        ctx.workspace.root().display()
    );
    if !ctx.confirm(&question)? {
        return Err(ExecutionError::Aborted.into());
    }

    probe::require_tools(ctx, &[Tool::Bosh, Tool::Docker])?;

    if ctx.workspace.has_director_state() {
        match director::load_director_access(ctx) {
            Ok(()) if director::director_reachable(ctx) => {
                cloudfoundry::delete_deployment(ctx);
            }
            Ok(()) => ctx.print_warn("Director is unreachable; skipping deployment deletion"),
            Err(e) => ctx.print_warn(&format!("Skipping deployment deletion: {}", e)),
        }

        ctx.print_info("Deleting BOSH director");
        director::delete_director(ctx)?;
    } else {
        ctx.print_info("No director state found; skipping director deletion");
    }

    network::remove_network(ctx)?;

    let removed = ctx.workspace.remove_generated()?;
    ctx.print_info(&format!("Removed {} generated file(s)", removed.len()));
    Ok(())
}
