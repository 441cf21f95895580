use std::fs;
use std::io;
use std::iter;
use std::path::{Path, PathBuf};

use crate::error::ProjectError;

/// Directory name of a freshly scaffolded mod.
pub const MOD_NAME: &str = "myMod";

/// Numbered fallbacks tried when [`MOD_NAME`] is taken: `myMod_0` to `myMod_9`.
const NUMBERED_ALTERNATIVES: u32 = 10;

/// Create `<workspace>/myMod/r6/scripts/main.reds` as an empty file.
///
/// A mod directory counts as taken when its `r6/scripts` folder exists.
/// Returns the path of the new script.
pub fn new_mod(workspace: &Path) -> Result<PathBuf, ProjectError> {
    if !workspace.is_dir() {
        return Err(ProjectError::Io {
            action: "cannot use workspace",
            path: workspace.to_path_buf(),
            source: io::ErrorKind::NotFound.into(),
        });
    }

    let candidates = iter::once(MOD_NAME.to_string())
        .chain((0..NUMBERED_ALTERNATIVES).map(|n| format!("{MOD_NAME}_{n}")));
    let scripts = candidates
        .map(|name| scripts_dir(&workspace.join(name)))
        .find(|dir| !dir.exists())
        .ok_or_else(|| ProjectError::ModExists {
            path: workspace.join(MOD_NAME),
        })?;

    fs::create_dir_all(&scripts).map_err(ProjectError::io("failed to create", &scripts))?;
    let main = scripts.join("main.reds");
    fs::write(&main, "").map_err(ProjectError::io("failed to create", &main))?;

    tracing::info!(path = %main.display(), "Mod created");
    Ok(main)
}

fn scripts_dir(mod_dir: &Path) -> PathBuf {
    mod_dir.join("r6").join("scripts")
}
