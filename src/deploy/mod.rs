//! Deployment steps and pipelines
//!
//! Each pipeline is a fixed, ordered list of steps. Steps either shell out
//! to an external tool or write a generated file into the workspace.

pub mod cloudfoundry;
pub mod director;
pub mod info;
pub mod network;
pub mod repos;
pub mod status;
pub mod stemcell;
pub mod teardown;
pub mod templates;
pub mod workspace;

pub use workspace::{DirectorCredentials, Workspace};

use crate::config::Tool;
use crate::error::Result;
use crate::runner::{probe, Context, Pipeline, Step};

fn detect_for_director(ctx: &mut Context) -> Result<()> {
    probe::require_tools(ctx, &[Tool::Bosh, Tool::Docker, Tool::Git])?;
    probe::require_docker_daemon(ctx)?;
    probe::detect_host(ctx);
    Ok(())
}

fn detect_for_cf(ctx: &mut Context) -> Result<()> {
    probe::require_tools(ctx, &[Tool::Bosh, Tool::Cf, Tool::Git])?;
    probe::detect_host(ctx);
    Ok(())
}

fn prepare_workspace(ctx: &mut Context) -> Result<()> {
    ctx.workspace.ensure()?;
    ctx.print_info(&format!("Workspace {}", ctx.workspace.root().display()));
    Ok(())
}

fn setup_network(ctx: &mut Context) -> Result<()> {
    network::ensure_network(ctx)
}

fn fetch_bosh_deployment(ctx: &mut Context) -> Result<()> {
    let dir = ctx.workspace.bosh_deployment_dir(&ctx.settings);
    repos::ensure_repo(ctx, &ctx.settings.director.repo_url, &dir)
}

fn fetch_cf_deployment(ctx: &mut Context) -> Result<()> {
    let dir = ctx.workspace.cf_deployment_dir(&ctx.settings);
    repos::ensure_repo(ctx, &ctx.settings.cf.repo_url, &dir)
}

/// Steps that bring up the director and prepare it for deployments
pub fn director_pipeline() -> Pipeline {
    Pipeline::new(
        "director",
        vec![
            Step::new("Detect environment", detect_for_director),
            Step::new("Prepare workspace", prepare_workspace),
            Step::new("Set up Docker network", setup_network),
            Step::new("Fetch bosh-deployment", fetch_bosh_deployment),
            Step::new("Create BOSH director", director::create_director),
            Step::new("Write director access files", director::write_director_access),
            Step::new("Wait for director", director::wait_for_director),
            Step::new("Update cloud config", director::update_cloud_config),
            Step::new("Update DNS runtime config", director::update_runtime_config),
            Step::new("Upload stemcell", stemcell::upload_stemcell),
            Step::new("Write connection info", info::write_connection_info),
        ],
    )
}

/// Steps that deploy the platform onto an existing director
pub fn cf_pipeline() -> Pipeline {
    Pipeline::new(
        "cf",
        vec![
            Step::new("Detect environment", detect_for_cf),
            Step::new("Load director access", director::load_director_access),
            Step::new("Fetch cf-deployment", fetch_cf_deployment),
            Step::new("Wait for director", director::wait_for_director),
            Step::new("Deploy Cloud Foundry", cloudfoundry::deploy_cf),
            Step::new("Log in to Cloud Foundry", cloudfoundry::login_cf),
            Step::new("Write connection info", info::write_connection_info),
        ],
    )
}

/// Director followed by platform
pub fn full_pipeline() -> Pipeline {
    director_pipeline().then(cf_pipeline())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_director_pipeline_order() {
        let names = director_pipeline().step_names();
        let pos = |name: &str| names.iter().position(|n| *n == name).unwrap();

        assert_eq!(names[0], "Detect environment");
        assert!(pos("Set up Docker network") < pos("Create BOSH director"));
        assert!(pos("Create BOSH director") < pos("Wait for director"));
        assert!(pos("Wait for director") < pos("Update cloud config"));
        assert!(pos("Update cloud config") < pos("Upload stemcell"));
        assert_eq!(*names.last().unwrap(), "Write connection info");
    }

    #[test]
    fn test_full_pipeline_is_director_then_cf() {
        let full = full_pipeline().step_names();
        let mut expected = director_pipeline().step_names();
        expected.extend(cf_pipeline().step_names());
        assert_eq!(full, expected);
    }
}
