//! Manifest repository checkouts

use crate::config::Tool;
use crate::error::Result;
use crate::runner::{execute, Context};
use std::path::Path;

/// Clone `url` into `dir` unless the directory already exists
pub fn ensure_repo(ctx: &Context, url: &str, dir: &Path) -> Result<()> {
    if dir.is_dir() {
        ctx.print_info(&format!("Using existing checkout {}", dir.display()));
        return Ok(());
    }

    if let Some(parent) = dir.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let inv = ctx
        .tool(Tool::Git)
        .args(["clone", "--depth", "1", url])
        .path_arg(dir);
    execute(&inv, ctx)?;
    Ok(())
}
