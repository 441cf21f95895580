//! Mod project lifecycle.
//!
//! A redscript mod is a directory laid out the way the game expects its
//! files to be installed:
//!
//! ```text
//! <modname>/
//!   r6/
//!     scripts/
//!       main.reds
//! ```
//!
//! These operations are sequential filesystem work: scaffolding a new mod,
//! copying a script into the game's `r6/scripts` folder and back out, and
//! packaging the `r6/` tree into `<modname>/<modname>.zip`.

mod deploy;
mod error;
mod package;
mod persist;
mod scaffold;

pub use deploy::{UndeployOutcome, deploy_file, undeploy_file};
pub use error::ProjectError;
pub use package::{ModLayout, package_mod};
pub use scaffold::{MOD_NAME, new_mod};
