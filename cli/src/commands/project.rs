//! `reds new`, `reds deploy`, `reds undeploy` and `reds package`.

use std::path::Path;

use anyhow::{Context, Result};
use reds_config::RedsConfig;
use reds_project::{UndeployOutcome, deploy_file, new_mod, package_mod, undeploy_file};

pub fn run_new(workspace: &Path) -> Result<()> {
    let main = new_mod(workspace)
        .with_context(|| format!("failed to scaffold a mod in {}", workspace.display()))?;
    println!("Created {}", main.display());
    Ok(())
}

pub fn run_deploy(config: &RedsConfig, file: &Path) -> Result<()> {
    let scripts_dir = config
        .script_deployment_folder()
        .context("cannot deploy without a game directory")?;
    let destination = deploy_file(file, &scripts_dir)?;
    tracing::info!(source = %file.display(), destination = %destination.display(), "Deployed");
    println!("Deployed {}", destination.display());
    Ok(())
}

pub fn run_undeploy(config: &RedsConfig, file: &Path) -> Result<()> {
    let scripts_dir = config
        .script_deployment_folder()
        .context("cannot undeploy without a game directory")?;
    match undeploy_file(file, &scripts_dir)? {
        UndeployOutcome::Removed(path) => {
            tracing::info!(path = %path.display(), "Undeployed");
            println!("Removed {}", path.display());
        }
        UndeployOutcome::NotDeployed(path) => {
            tracing::info!(path = %path.display(), "Nothing to undeploy");
            println!("{} is not deployed", path.display());
        }
    }
    Ok(())
}

pub fn run_package(file: &Path) -> Result<()> {
    let archive = package_mod(file)?;
    tracing::info!(archive = %archive.display(), "Packaged mod");
    println!("Packaged {}", archive.display());
    Ok(())
}
