//! Diagnostic reconciler: owns the published diagnostic set.
//!
//! A lint pass is authoritative for everything it reports, including files
//! other than the one that triggered it, so each pass replaces the whole
//! published set. Only the manager mutates this store.

use std::collections::{BTreeSet, HashMap};
use std::mem;
use std::path::{Path, PathBuf};

use reds_types::{DiagnosticRecord, DiagnosticsSnapshot};

pub(crate) struct Reconciler {
    published: HashMap<PathBuf, Vec<DiagnosticRecord>>,
    /// Paths whose published list differs from what hosts last took.
    changed: BTreeSet<PathBuf>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            published: HashMap::new(),
            changed: BTreeSet::new(),
        }
    }

    /// Replace the published set with `records`, grouped by their own file.
    ///
    /// Relative file names are resolved against `base_dir`, the source root
    /// of the run that printed them.
    pub fn publish(&mut self, records: Vec<DiagnosticRecord>, base_dir: &Path) {
        let mut grouped: HashMap<PathBuf, Vec<DiagnosticRecord>> = HashMap::new();
        for record in records {
            let path = resolve(record.file(), base_dir);
            grouped.entry(path).or_default().push(record);
        }

        for (path, items) in &self.published {
            if grouped.get(path) != Some(items) {
                self.changed.insert(path.clone());
            }
        }
        for (path, items) in &grouped {
            if self.published.get(path) != Some(items) {
                self.changed.insert(path.clone());
            }
        }
        self.published = grouped;
    }

    /// Remove one file from the published set.
    pub fn clear(&mut self, path: &Path) {
        if self.published.remove(path).is_some() {
            self.changed.insert(path.to_path_buf());
        }
    }

    pub fn clear_all(&mut self) {
        for (path, _) in self.published.drain() {
            self.changed.insert(path);
        }
    }

    pub fn get(&self, path: &Path) -> Option<&[DiagnosticRecord]> {
        self.published.get(path).map(Vec::as_slice)
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot::new(
            self.published
                .iter()
                .map(|(path, items)| (path.clone(), items.clone()))
                .collect(),
        )
    }

    /// Drain changed paths with their current records; an empty list means
    /// the file no longer has diagnostics.
    pub fn take_changes(&mut self) -> Vec<(PathBuf, Vec<DiagnosticRecord>)> {
        mem::take(&mut self.changed)
            .into_iter()
            .map(|path| {
                let items = self.published.get(&path).cloned().unwrap_or_default();
                (path, items)
            })
            .collect()
    }
}

fn resolve(file: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
