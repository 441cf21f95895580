//! Diagnostic pipeline for the redscript compiler.
//!
//! Runs the compiler in lint mode for every open source document, parses its
//! text output and keeps one published diagnostic set for the host.

pub mod notify;
pub mod parser;
pub mod process;
pub mod types;

pub(crate) mod diagnostics;

mod error;
mod manager;
mod pipeline;

pub use error::LintError;
pub use manager::LintManager;
pub use notify::{LogNotifier, NoticeLevel, Notifier};
pub use parser::parse_output;
pub use pipeline::{LintOutcome, lint_document};
pub use process::{CommandLine, ProcessError, ProcessOutput, ProcessRunner, RunFut, SystemRunner};
pub use types::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_SOURCE_EXTENSION, Grammar, LintConfig, LintSettings, OutputStream,
};
