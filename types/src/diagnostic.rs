use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity level reported by the compiler.
///
/// Tool versions that do not differentiate levels report everything as
/// [`Severity::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Map a bracketed level tag from compiler output (`ERROR`, `WARN`, `INFO`).
    ///
    /// Returns `None` for unknown tags; the parser decides the fallback.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ERROR" => Some(Self::Error),
            "WARN" => Some(Self::Warning),
            "INFO" => Some(Self::Info),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One problem reported by a lint run.
///
/// Fields are private and there are no setters: a record is built once by the
/// parser and replaced wholesale by the next lint pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    file: String,
    /// 1-based, as printed by the compiler.
    line: u32,
    /// 1-based, as printed by the compiler.
    column: u32,
    message: String,
    severity: Severity,
}

impl DiagnosticRecord {
    #[must_use]
    pub fn new(
        file: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            message: message.into(),
            severity,
        }
    }

    /// File path exactly as the compiler printed it (absolute or relative).
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Message text; may span several lines.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Zero-based `(line, column)` for editors.
    #[must_use]
    pub fn zero_based_position(&self) -> (u32, u32) {
        (self.line.saturating_sub(1), self.column.saturating_sub(1))
    }
}

/// `file:line:column: severity: message`, continuation lines indented.
impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: ",
            self.file, self.line, self.column, self.severity
        )?;
        let mut lines = self.message.lines();
        if let Some(first) = lines.next() {
            f.write_str(first)?;
        }
        for line in lines {
            write!(f, "\n    {line}")?;
        }
        Ok(())
    }
}
