//! Connection info and shell environment output

use crate::deploy::templates::{self, PlatformInfo};
use crate::error::{ExecutionError, Result};
use crate::runner::Context;
use std::fs;
use std::path::Path;

/// Write the connection info file, with a platform section once it is deployed
pub fn write_connection_info(ctx: &mut Context) -> Result<()> {
    let creds = ctx.workspace.director_credentials()?;

    let platform = if ctx.workspace.cf_vars_file().is_file() {
        Some(PlatformInfo {
            admin_password: ctx.workspace.cf_admin_password()?,
        })
    } else {
        None
    };

    let text = templates::connection_info(ctx, &creds, platform.as_ref())?;
    let path = ctx.workspace.info_file();
    ctx.workspace.write(&path, &text)?;
    ctx.print_info(&format!(
        "Connection details written to {} (run `cfdock info`)",
        path.display()
    ));
    Ok(())
}

fn read_artifact(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(ExecutionError::MissingState(path.to_path_buf()).into());
    }
    Ok(fs::read_to_string(path)?)
}

/// Contents of the connection info file
pub fn connection_info(ctx: &Context) -> Result<String> {
    read_artifact(&ctx.workspace.info_file())
}

/// Contents of the shell export file
pub fn env_exports(ctx: &Context) -> Result<String> {
    read_artifact(&ctx.workspace.env_file())
}
