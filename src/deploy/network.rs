//! Docker network management
//!
//! The director and every VM it creates attach to one user-defined bridge
//! network.

use crate::config::Tool;
use crate::error::Result;
use crate::runner::{check, execute, Context};

/// Check whether the configured network exists
pub fn network_exists(ctx: &Context) -> bool {
    let name = &ctx.settings.network.name;
    check(
        &ctx.tool(Tool::Docker).args(["network", "inspect", name.as_str()]),
        ctx,
    )
}

/// Create the network unless it already exists
pub fn ensure_network(ctx: &Context) -> Result<()> {
    let net = &ctx.settings.network;

    if network_exists(ctx) {
        ctx.print_info(&format!("Docker network '{}' already exists", net.name));
        return Ok(());
    }

    let inv = ctx.tool(Tool::Docker).args([
        "network",
        "create",
        "--driver",
        "bridge",
        "--subnet",
        net.subnet.as_str(),
        "--gateway",
        net.gateway.as_str(),
        net.name.as_str(),
    ]);
    execute(&inv, ctx)?;
    ctx.print_info(&format!("Created Docker network '{}' ({})", net.name, net.subnet));
    Ok(())
}

/// Remove the network if it exists
pub fn remove_network(ctx: &Context) -> Result<()> {
    let name = &ctx.settings.network.name;

    if !network_exists(ctx) {
        ctx.print_debug(&format!("Docker network '{}' does not exist", name));
        return Ok(());
    }

    execute(
        &ctx.tool(Tool::Docker).args(["network", "rm", name.as_str()]),
        ctx,
    )?;
    Ok(())
}

/// Names of running containers attached to the network
pub fn attached_containers(ctx: &Context) -> Vec<String> {
    let filter = format!("network={}", ctx.settings.network.name);
    let inv = ctx
        .tool(Tool::Docker)
        .args(["ps", "--filter", filter.as_str(), "--format", "{{.Names}}"]);

    crate::runner::capture(&inv, ctx)
        .map(|out| {
            out.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
