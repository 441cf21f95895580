//! reds CLI - binary entry point.
//!
//! `reds serve` runs the language server on stdio; every other subcommand
//! is a one-shot operation that prints its result and exits.

mod cli;
mod commands;

use std::env;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use reds_config::RedsConfig;
use reds_server::ServeOptions;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, Commands};
use crate::commands::{check, project};

fn init_tracing(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();
    let log_path = log_file.as_ref().map(|(path, _)| path.clone());

    // stdout carries the protocol in `serve`; without a file, logs are dropped.
    let file_layer = log_file
        .map(|(_, file)| fmt::layer().with_ansi(false).with_writer(Mutex::new(file)));
    let stderr_layer = verbose.then(|| fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(env_filter)
        .init();

    if let Some(path) = log_path {
        tracing::info!(path = %path.display(), "Logging initialized");
    }
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.reds/logs/reds.log
    if let Some(config_path) = reds_config::config_path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("reds.log"));
    }

    // Fallback: ./.reds/logs/reds.log
    candidates.push(PathBuf::from(".reds").join("logs").join("reds.log"));

    candidates
}

fn load_config(user_path: Option<&Path>, workspace: Option<&Path>) -> Result<RedsConfig> {
    let cwd;
    let workspace = match workspace {
        Some(dir) => dir,
        None => {
            cwd = env::current_dir().context("read current directory")?;
            &cwd
        }
    };
    RedsConfig::load(user_path, Some(workspace)).context("failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let user_config = cli.config.as_deref();
    match cli.command {
        Commands::Check {
            files,
            workspace,
            format,
        } => {
            let config = load_config(user_config, workspace.as_deref())?;
            check::run_check(&config, &files, workspace.as_deref(), format).await
        }
        Commands::Serve => {
            reds_server::run(ServeOptions {
                config_path: cli.config.clone(),
            })
            .await;
            Ok(ExitCode::SUCCESS)
        }
        Commands::New { workspace } => {
            project::run_new(&workspace)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Deploy { file } => {
            let config = load_config(user_config, None)?;
            project::run_deploy(&config, &file)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Undeploy { file } => {
            let config = load_config(user_config, None)?;
            project::run_undeploy(&config, &file)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Package { file } => {
            project::run_package(&file)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
