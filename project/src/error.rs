use std::io;
use std::path::PathBuf;

use reds_types::ConfigurationError;

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(
        "redscript files need to be nested like so: modname/r6/scripts/file.reds (got {})",
        path.display()
    )]
    InvalidLayout { path: PathBuf },
    #[error("mod already exists: {} and its numbered alternatives are taken", path.display())]
    ModExists { path: PathBuf },
    #[error("failed to write archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl ProjectError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}
