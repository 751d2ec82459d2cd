//! Cloud Foundry deployment and login

use crate::config::Tool;
use crate::deploy::templates::api_endpoint;
use crate::error::Result;
use crate::runner::{execute, Context, Invocation};

/// Build the `bosh deploy` call for cf-deployment
pub fn deploy_invocation(ctx: &Context) -> Result<Invocation> {
    let settings = &ctx.settings;
    let repo = ctx.workspace.cf_deployment_dir(settings);

    let mut inv = ctx
        .bosh()
        .args(["-n", "-d", settings.cf.deployment.as_str(), "deploy"])
        .path_arg(&repo.join("cf-deployment.yml"));

    for op in &settings.cf.ops_files {
        inv = inv.arg("-o").path_arg(&repo.join(op));
    }

    Ok(inv
        .arg("--vars-store")
        .path_arg(&ctx.workspace.cf_vars_file())
        .arg("-v")
        .arg(format!("system_domain={}", ctx.system_domain())))
}

/// Deploy the platform onto the director
pub fn deploy_cf(ctx: &mut Context) -> Result<()> {
    ctx.workspace.require_director_state()?;
    let inv = deploy_invocation(ctx)?;
    execute(&inv, ctx)?;
    Ok(())
}

/// The `cf` calls that log in and target the configured org and space
pub fn login_invocations(ctx: &Context, password: &str) -> Vec<Invocation> {
    let cf = &ctx.settings.cf;
    let tool = || ctx.tool(Tool::Cf);

    let mut api = tool().arg("api").arg(api_endpoint(ctx));
    if cf.skip_ssl_validation {
        api = api.arg("--skip-ssl-validation");
    }

    vec![
        api,
        tool()
            .arg("auth")
            .arg(cf.admin_user.as_str())
            .secret_arg(password),
        tool().args(["create-org", cf.org.as_str()]),
        tool().args(["create-space", cf.space.as_str(), "-o", cf.org.as_str()]),
        tool().args(["target", "-o", cf.org.as_str(), "-s", cf.space.as_str()]),
    ]
}

/// Log in as the admin user and target the configured org and space
pub fn login_cf(ctx: &mut Context) -> Result<()> {
    let password = ctx.workspace.cf_admin_password()?;
    for inv in login_invocations(ctx, &password) {
        execute(&inv, ctx)?;
    }
    Ok(())
}

/// Delete the platform deployment; failures are reported, not returned
pub fn delete_deployment(ctx: &Context) {
    let inv = ctx.bosh().args([
        "-n",
        "-d",
        ctx.settings.cf.deployment.as_str(),
        "delete-deployment",
        "--force",
    ]);
    if let Err(e) = execute(&inv, ctx) {
        ctx.print_warn(&format!("Could not delete deployment: {}", e));
    }
}
