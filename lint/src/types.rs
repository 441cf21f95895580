//! Public configuration types consumed by the lint pipeline.
//!
//! Hosts build a [`LintSettings`] (usually through `reds-config`) and hand it
//! to [`LintManager`](crate::LintManager). The `[lint]` table of the config
//! file deserialises straight into [`LintConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use reds_types::{ConfigurationError, DocumentKey};
use serde::Deserialize;

use crate::process::CommandLine;

/// Default debounce window, matching what editors feel as "instant" on save.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Extension of redscript source files.
pub const DEFAULT_SOURCE_EXTENSION: &str = "reds";

const fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_source_extension() -> String {
    DEFAULT_SOURCE_EXTENSION.to_string()
}

/// Output grammar of the integrated compiler version.
///
/// The two grammars never appear mixed in one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grammar {
    /// `[ERROR] At file:line:col:` / `[WARN]` / `[INFO]` headers.
    #[default]
    Tagged,
    /// `Compilation error at file:line:col:` headers; every entry is an error.
    Legacy,
}

impl Grammar {
    /// Stream this grammar's diagnostics are printed on.
    #[must_use]
    pub const fn default_stream(self) -> OutputStream {
        match self {
            Self::Tagged => OutputStream::Stderr,
            Self::Legacy => OutputStream::Stdout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// The `[lint]` configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LintConfig {
    /// Debounce window in milliseconds. Default: 200.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Output grammar. Default: tagged.
    #[serde(default)]
    pub grammar: Grammar,
    /// Override of the stream the grammar is read from.
    #[serde(default)]
    pub stream: Option<OutputStream>,
    /// Extension (without dot) of documents that get a pipeline. Default: "reds".
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            grammar: Grammar::default(),
            stream: None,
            source_extension: default_source_extension(),
        }
    }
}

/// Everything a lint run needs, already resolved from configuration.
///
/// Required paths stay optional here; they are validated each time a command
/// line is built so a missing setting surfaces as a [`ConfigurationError`] on
/// the attempt that needed it.
#[derive(Debug, Clone, Default)]
pub struct LintSettings {
    /// Compiler executable.
    pub compiler_path: Option<PathBuf>,
    /// Compiled-script blob, after the `game_dir` fallback was applied.
    pub script_blob_path: Option<PathBuf>,
    pub lint: LintConfig,
}

impl LintSettings {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.lint.debounce_ms)
    }

    #[must_use]
    pub fn grammar(&self) -> Grammar {
        self.lint.grammar
    }

    #[must_use]
    pub fn stream(&self) -> OutputStream {
        self.lint
            .stream
            .unwrap_or_else(|| self.lint.grammar.default_stream())
    }

    /// Whether `key` is a source document this pipeline lints.
    #[must_use]
    pub fn is_eligible(&self, key: &DocumentKey) -> bool {
        key.has_extension(&self.lint.source_extension)
    }

    /// `<compiler> lint -s <source> -b <blob>`, run inside `workspace_root`
    /// when the document belongs to one.
    pub fn lint_command(
        &self,
        source: &Path,
        workspace_root: Option<&Path>,
    ) -> Result<CommandLine, ConfigurationError> {
        let compiler = self
            .compiler_path
            .as_deref()
            .ok_or(ConfigurationError::MissingCompilerPath)?;
        let blob = self
            .script_blob_path
            .as_deref()
            .ok_or(ConfigurationError::MissingScriptCachePath)?;

        let mut command = CommandLine::new(compiler)
            .arg("lint")
            .arg("-s")
            .arg(source)
            .arg("-b")
            .arg(blob);
        if let Some(root) = workspace_root {
            command = command.current_dir(root);
        }
        Ok(command)
    }
}
