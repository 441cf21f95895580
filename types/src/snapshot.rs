use std::path::{Path, PathBuf};

use crate::{DiagnosticRecord, Severity};

/// Immutable view of the published diagnostic set, suitable for rendering.
///
/// Counts are computed from `files` on demand so they can never drift from
/// the records themselves.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsSnapshot {
    /// Per-file diagnostics, error-containing files first, then by path.
    files: Vec<(PathBuf, Vec<DiagnosticRecord>)>,
}

impl DiagnosticsSnapshot {
    /// Build a snapshot, ordering files with errors first and then by path.
    #[must_use]
    pub fn new(mut files: Vec<(PathBuf, Vec<DiagnosticRecord>)>) -> Self {
        files.retain(|(_, items)| !items.is_empty());
        files.sort_by(|a, b| {
            let a_has_errors = a.1.iter().any(|d| d.severity().is_error());
            let b_has_errors = b.1.iter().any(|d| d.severity().is_error());
            b_has_errors.cmp(&a_has_errors).then_with(|| a.0.cmp(&b.0))
        });
        Self { files }
    }

    #[must_use]
    pub fn files(&self) -> &[(PathBuf, Vec<DiagnosticRecord>)] {
        &self.files
    }

    /// Diagnostics published for `path`, if any.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&[DiagnosticRecord]> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, items)| items.as_slice())
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn count_by_severity(&self, severity: Severity) -> usize {
        self.files
            .iter()
            .flat_map(|(_, items)| items)
            .filter(|d| d.severity() == severity)
            .count()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count_by_severity(Severity::Error)
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count_by_severity(Severity::Warning)
    }

    #[must_use]
    pub fn info_count(&self) -> usize {
        self.count_by_severity(Severity::Info)
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.files.iter().map(|(_, items)| items.len()).sum()
    }
}
