use reds_types::ConfigurationError;

use crate::process::ProcessError;

/// Why a lint run produced no diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    /// Nothing was spawned; published diagnostics are left alone.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The compiler failed; the document's diagnostics are cleared.
    #[error(transparent)]
    Process(#[from] ProcessError),
}
