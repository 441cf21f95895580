use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of an open source document.
///
/// Keys are compared by path, so callers must hand in the same spelling for
/// open, save and close (editors do; they send the same URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentKey(PathBuf);

impl DocumentKey {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Whether the document's extension equals `extension` (without the dot,
    /// ASCII case-insensitive).
    #[must_use]
    pub fn has_extension(&self, extension: &str) -> bool {
        self.0
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension))
    }
}

impl From<PathBuf> for DocumentKey {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for DocumentKey {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
