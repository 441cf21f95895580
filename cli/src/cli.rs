//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// reds - redscript diagnostics and mod project tooling
#[derive(Parser)]
#[command(name = "reds")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// User configuration file (replaces ~/.reds/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Also write logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint files once and print their diagnostics
    Check {
        /// Source files to lint
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Lint the whole workspace rooted here instead of each file alone
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Start the language server on stdio
    Serve,

    /// Scaffold a new mod project
    New {
        /// Directory to create the mod in
        #[arg(default_value = ".")]
        workspace: PathBuf,
    },

    /// Copy a script into the game's script folder
    Deploy {
        file: PathBuf,
    },

    /// Remove a deployed copy of a script from the game's script folder
    Undeploy {
        file: PathBuf,
    },

    /// Package the mod containing a script into a zip archive
    Package {
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
