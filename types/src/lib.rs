//! Core domain types for reds.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! The lint pipeline, the project commands and the editor adapter all speak
//! in these types.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod diagnostic;
mod key;
mod sanitize;
mod snapshot;

pub use diagnostic::{DiagnosticRecord, Severity};
pub use key::DocumentKey;
pub use sanitize::strip_terminal_escapes;
pub use snapshot::DiagnosticsSnapshot;

use thiserror::Error;

/// A required path setting is absent.
///
/// Raised at the point of use, never while loading configuration: a config
/// file without `compiler_path` is valid until something tries to lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("redscript configuration missing: `compiler_path` is not set, consult the README")]
    MissingCompilerPath,
    #[error(
        "redscript configuration missing: neither `script_cache_path` nor `game_dir` is set, consult the README"
    )]
    MissingScriptCachePath,
    #[error("redscript configuration missing: `game_dir` is not set, consult the README")]
    MissingGameDir,
}

impl ConfigurationError {
    /// Name of the setting the user has to provide.
    #[must_use]
    pub const fn setting(self) -> &'static str {
        match self {
            Self::MissingCompilerPath => "compiler_path",
            Self::MissingScriptCachePath => "script_cache_path",
            Self::MissingGameDir => "game_dir",
        }
    }
}
