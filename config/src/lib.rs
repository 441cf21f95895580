//! Configuration loading for reds.
//!
//! Two TOML files are read: the user file (`~/.reds/config.toml`, or an
//! explicit `--config` path) and the workspace file (`<workspace>/.reds.toml`).
//! Workspace values override user values key by key. A missing file is an
//! empty configuration.
//!
//! Required paths are not validated here. Accessors return `Option`s, and
//! the pipeline or project command that needs a value raises a
//! [`ConfigurationError`] when it is absent.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use reds_lint::{Grammar, LintConfig, LintSettings, OutputStream};
use reds_types::ConfigurationError;
use serde::Deserialize;

/// Name of the per-workspace override file.
pub const WORKSPACE_CONFIG_FILE: &str = ".reds.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

/// Contents of one config file. Every key is optional so that files can be
/// layered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RedsConfig {
    /// Path to the `redscript-cli` executable.
    pub compiler_path: Option<String>,
    /// Path to the compiled-script blob (`final.redscripts.bk`).
    pub script_cache_path: Option<String>,
    /// Game installation directory.
    pub game_dir: Option<String>,
    pub lint: Option<LintTable>,
}

/// The `[lint]` table as written in a file; unset keys fall through to the
/// layer below and finally to [`LintConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LintTable {
    pub debounce_ms: Option<u64>,
    pub grammar: Option<Grammar>,
    pub stream: Option<OutputStream>,
    pub source_extension: Option<String>,
}

impl LintTable {
    fn overlay(self, top: Self) -> Self {
        Self {
            debounce_ms: top.debounce_ms.or(self.debounce_ms),
            grammar: top.grammar.or(self.grammar),
            stream: top.stream.or(self.stream),
            source_extension: top.source_extension.or(self.source_extension),
        }
    }
}

impl RedsConfig {
    /// Load the user file and the workspace file and layer them.
    ///
    /// `user_path` replaces the default user file location when given.
    pub fn load(user_path: Option<&Path>, workspace: Option<&Path>) -> Result<Self, ConfigError> {
        let user_path = user_path.map(Path::to_path_buf).or_else(config_path);
        let user = match user_path {
            Some(path) => Self::load_from(&path)?.unwrap_or_default(),
            None => Self::default(),
        };
        let local = match workspace {
            Some(root) => Self::load_from(&root.join(WORKSPACE_CONFIG_FILE))?.unwrap_or_default(),
            None => Self::default(),
        };
        Ok(user.overlay(local))
    }

    /// Read one file. `Ok(None)` when it does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                tracing::warn!("Failed to read config at {}: {err}", path.display());
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "Loaded config");
                Ok(Some(config))
            }
            Err(err) => {
                tracing::warn!("Failed to parse config at {}: {err}", path.display());
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// `top` wins for every key it sets.
    #[must_use]
    pub fn overlay(self, top: Self) -> Self {
        let lint = match (self.lint, top.lint) {
            (Some(lower), Some(upper)) => Some(lower.overlay(upper)),
            (lower, upper) => upper.or(lower),
        };
        Self {
            compiler_path: top.compiler_path.or(self.compiler_path),
            script_cache_path: top.script_cache_path.or(self.script_cache_path),
            game_dir: top.game_dir.or(self.game_dir),
            lint,
        }
    }

    #[must_use]
    pub fn compiler_path(&self) -> Option<PathBuf> {
        expand_path(self.compiler_path.as_deref())
    }

    #[must_use]
    pub fn game_dir(&self) -> Option<PathBuf> {
        expand_path(self.game_dir.as_deref())
    }

    /// `script_cache_path`, or `<game_dir>/r6/cache/final.redscripts.bk`.
    #[must_use]
    pub fn script_blob_path(&self) -> Option<PathBuf> {
        expand_path(self.script_cache_path.as_deref()).or_else(|| {
            self.game_dir()
                .map(|dir| dir.join("r6").join("cache").join("final.redscripts.bk"))
        })
    }

    /// `<game_dir>/r6/scripts`, where the game loads loose scripts from.
    pub fn script_deployment_folder(&self) -> Result<PathBuf, ConfigurationError> {
        self.game_dir()
            .map(|dir| dir.join("r6").join("scripts"))
            .ok_or(ConfigurationError::MissingGameDir)
    }

    #[must_use]
    pub fn lint_config(&self) -> LintConfig {
        let table = self.lint.clone().unwrap_or_default();
        let defaults = LintConfig::default();
        LintConfig {
            debounce_ms: table.debounce_ms.unwrap_or(defaults.debounce_ms),
            grammar: table.grammar.unwrap_or(defaults.grammar),
            stream: table.stream.or(defaults.stream),
            source_extension: table
                .source_extension
                .map(|ext| ext.trim_start_matches('.').to_string())
                .filter(|ext| !ext.is_empty())
                .unwrap_or(defaults.source_extension),
        }
    }

    #[must_use]
    pub fn lint_settings(&self) -> LintSettings {
        LintSettings {
            compiler_path: self.compiler_path(),
            script_blob_path: self.script_blob_path(),
            lint: self.lint_config(),
        }
    }
}

/// Expand `${VAR}` references. Unset variables expand to nothing; an
/// unterminated `${` is kept as written.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Expanded path, `None` for unset or blank values.
fn expand_path(value: Option<&str>) -> Option<PathBuf> {
    let expanded = expand_env_vars(value?);
    let trimmed = expanded.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

/// Default user config location, `~/.reds/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".reds").join("config.toml"))
}
