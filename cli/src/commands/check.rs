//! `reds check`: lint once, print the published set and summarise it.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use reds_config::RedsConfig;
use reds_lint::{LintError, LintSettings, ProcessRunner, SystemRunner, lint_document};
use reds_types::{DiagnosticRecord, DiagnosticsSnapshot, DocumentKey};
use serde::Serialize;

use crate::cli::OutputFormat;

/// One file of the JSON output.
#[derive(Debug, Serialize)]
struct FileReport<'a> {
    path: &'a Path,
    diagnostics: &'a [DiagnosticRecord],
}

/// Everything one `reds check` invocation found.
struct CheckOutcome {
    snapshot: DiagnosticsSnapshot,
    /// At least one compiler run failed.
    failed: bool,
}

pub async fn run_check(
    config: &RedsConfig,
    files: &[PathBuf],
    workspace: Option<&Path>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let outcome = collect(&config.lint_settings(), &SystemRunner, files, workspace).await?;
    let snapshot = &outcome.snapshot;

    match format {
        OutputFormat::Text => print_text(snapshot),
        OutputFormat::Json => {
            let reports: Vec<FileReport<'_>> = snapshot
                .files()
                .iter()
                .map(|(path, diagnostics)| FileReport { path, diagnostics })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&reports).context("serialize diagnostics")?
            );
        }
    }

    if outcome.failed || snapshot.error_count() > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Run the compiler and merge its reports, one entry per file.
///
/// A workspace run covers every file under the workspace, so it happens
/// once; without a workspace every eligible file is linted on its own.
async fn collect(
    settings: &LintSettings,
    runner: &dyn ProcessRunner,
    files: &[PathBuf],
    workspace: Option<&Path>,
) -> Result<CheckOutcome> {
    let workspace = workspace.map(absolute).transpose()?;

    let mut keys = Vec::new();
    for file in files {
        let key = DocumentKey::new(absolute(file)?);
        if settings.is_eligible(&key) {
            keys.push(key);
        } else {
            tracing::info!(path = %key, "Skipping file with unexpected extension");
        }
    }
    if workspace.is_some() {
        keys.truncate(1);
    }

    let mut published: BTreeMap<PathBuf, Vec<DiagnosticRecord>> = BTreeMap::new();
    let mut failed = false;
    for key in &keys {
        match lint_document(settings, runner, key, workspace.as_deref()).await {
            Ok(outcome) => {
                // A later run is authoritative for every file it reports.
                published.extend(group_by_file(outcome.records, &outcome.base_dir));
            }
            Err(err @ LintError::Configuration(_)) => {
                return Err(err).context("cannot lint without compiler configuration");
            }
            Err(err) => {
                tracing::error!(path = %key, "{err}");
                eprintln!("{}: {err}", key.path().display());
                failed = true;
            }
        }
    }

    Ok(CheckOutcome {
        snapshot: DiagnosticsSnapshot::new(published.into_iter().collect()),
        failed,
    })
}

/// Group records by resolved file.
fn group_by_file(
    records: Vec<DiagnosticRecord>,
    base_dir: &Path,
) -> BTreeMap<PathBuf, Vec<DiagnosticRecord>> {
    let mut grouped: BTreeMap<PathBuf, Vec<DiagnosticRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(base_dir.join(record.file()))
            .or_default()
            .push(record);
    }
    grouped
}

fn format_text(path: &Path, record: &DiagnosticRecord) -> String {
    let mut lines = record.message().lines();
    let mut out = format!(
        "{}:{}:{}: {}: {}",
        path.display(),
        record.line(),
        record.column(),
        record.severity(),
        lines.next().unwrap_or_default()
    );
    for line in lines {
        out.push_str("\n    ");
        out.push_str(line);
    }
    out
}

fn summary(snapshot: &DiagnosticsSnapshot) -> String {
    format!(
        "{} error(s), {} warning(s), {} info",
        snapshot.error_count(),
        snapshot.warning_count(),
        snapshot.info_count()
    )
}

fn print_text(snapshot: &DiagnosticsSnapshot) {
    for (path, records) in snapshot.files() {
        for record in records {
            println!("{}", format_text(path, record));
        }
    }
    if snapshot.total_count() > 0 {
        println!("\n{}", summary(snapshot));
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().context("read current directory")?;
    Ok(cwd.join(path))
}
