//! LSP type conversion utilities.

use std::path::{Path, PathBuf};

use reds_types::{DiagnosticRecord, Severity};
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range, Url};

/// `source` of every published diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "redscript";

/// The compiler reports a start position only; the underline ends this many
/// columns past the reported (one-based) column and editors clamp it to the
/// end of the line.
const RANGE_WIDTH: u32 = 100;

#[must_use]
pub fn to_lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Info => DiagnosticSeverity::INFORMATION,
    }
}

/// Converts a compiler diagnostic to an LSP diagnostic.
#[must_use]
pub fn to_lsp_diagnostic(record: &DiagnosticRecord) -> Diagnostic {
    let (line, column) = record.zero_based_position();
    let range = Range::new(
        Position::new(line, column),
        Position::new(line, record.column().saturating_add(RANGE_WIDTH)),
    );

    Diagnostic {
        range,
        severity: Some(to_lsp_severity(record.severity())),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: record.message().to_string(),
        ..Default::default()
    }
}

/// `file://` URL for a path; `None` for relative paths.
#[must_use]
pub fn path_to_url(path: &Path) -> Option<Url> {
    Url::from_file_path(path).ok()
}

/// Local path of a `file://` URL; `None` for other schemes.
#[must_use]
pub fn url_to_path(url: &Url) -> Option<PathBuf> {
    url.to_file_path().ok()
}
