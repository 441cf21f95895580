//! Copy a script into the game's `r6/scripts` folder and remove it again.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ProjectError;

/// What [`undeploy_file`] found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndeployOutcome {
    Removed(PathBuf),
    /// Nothing with that name was deployed; not an error.
    NotDeployed(PathBuf),
}

/// Copy `source` into `scripts_dir` under its base name, creating the folder
/// when missing. Returns the destination path.
pub fn deploy_file(source: &Path, scripts_dir: &Path) -> Result<PathBuf, ProjectError> {
    let destination = destination(source, scripts_dir)?;
    fs::create_dir_all(scripts_dir).map_err(ProjectError::io("failed to create", scripts_dir))?;
    fs::copy(source, &destination).map_err(ProjectError::io("failed to copy", source))?;

    tracing::info!(
        source = %source.display(),
        destination = %destination.display(),
        "Deployed script"
    );
    Ok(destination)
}

/// Delete the deployed copy of `source` from `scripts_dir`, if any.
pub fn undeploy_file(source: &Path, scripts_dir: &Path) -> Result<UndeployOutcome, ProjectError> {
    let destination = destination(source, scripts_dir)?;
    match fs::remove_file(&destination) {
        Ok(()) => {
            tracing::info!(path = %destination.display(), "Removed deployed script");
            Ok(UndeployOutcome::Removed(destination))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %destination.display(), "No file to delete");
            Ok(UndeployOutcome::NotDeployed(destination))
        }
        Err(err) => Err(ProjectError::Io {
            action: "failed to delete",
            path: destination,
            source: err,
        }),
    }
}

fn destination(source: &Path, scripts_dir: &Path) -> Result<PathBuf, ProjectError> {
    let name = source.file_name().ok_or_else(|| ProjectError::Io {
        action: "not a file",
        path: source.to_path_buf(),
        source: io::ErrorKind::InvalidInput.into(),
    })?;
    Ok(scripts_dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deploy_copies_under_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("mod").join("main.reds");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "func Main() {}").unwrap();
        let scripts = dir.path().join("game").join("r6").join("scripts");

        let destination = deploy_file(&source, &scripts).unwrap();

        assert_eq!(destination, scripts.join("main.reds"));
        assert_eq!(fs::read_to_string(&destination).unwrap(), "func Main() {}");
        assert!(source.exists());
    }

    #[test]
    fn deploy_overwrites_previous_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("main.reds");
        let scripts = dir.path().join("scripts");
        fs::write(&source, "v1").unwrap();
        deploy_file(&source, &scripts).unwrap();
        fs::write(&source, "v2").unwrap();

        let destination = deploy_file(&source, &scripts).unwrap();
        assert_eq!(fs::read_to_string(destination).unwrap(), "v2");
    }

    #[test]
    fn deploy_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = deploy_file(&dir.path().join("gone.reds"), dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::Io { .. }));
    }

    #[test]
    fn undeploy_removes_deployed_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("main.reds");
        let scripts = dir.path().join("scripts");
        fs::write(&source, "x").unwrap();
        let deployed = deploy_file(&source, &scripts).unwrap();

        let outcome = undeploy_file(&source, &scripts).unwrap();

        assert_eq!(outcome, UndeployOutcome::Removed(deployed.clone()));
        assert!(!deployed.exists());
        assert!(source.exists());
    }

    #[test]
    fn undeploy_without_copy_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = undeploy_file(&dir.path().join("main.reds"), dir.path()).unwrap();
        assert_eq!(
            outcome,
            UndeployOutcome::NotDeployed(dir.path().join("main.reds"))
        );
    }
}
