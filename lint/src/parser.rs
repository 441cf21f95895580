//! Diagnostic parser: compiler text output to [`DiagnosticRecord`]s.
//!
//! Pure and deterministic. An entry starts at a header matching the
//! configured [`Grammar`] and its message runs until the next header or the
//! end of input. Line terminators between a message and the next header are
//! not part of the message.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use reds_types::{DiagnosticRecord, Severity, strip_terminal_escapes};

use crate::types::Grammar;

// File: an optional drive prefix (`C:`) followed by anything up to the next
// colon. Line and column are captured loosely so that a malformed number
// still ends the previous entry and can be dropped on its own.
static TAGGED_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(ERROR|WARN|INFO)\] At (\S:?[^:\n]*):([^:\n]*):([^:\n]*):[ \t]*\r?\n")
        .expect("tagged header pattern is valid")
});

static LEGACY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Compilation error at (\S:?[^:\n]*):([^:\n]*):([^:\n]*):[ \t]*\r?\n")
        .expect("legacy header pattern is valid")
});

/// Capture group indexes for one grammar.
struct Layout {
    level: Option<usize>,
    file: usize,
    line: usize,
    column: usize,
}

impl Grammar {
    fn header(self) -> &'static Regex {
        match self {
            Self::Tagged => &TAGGED_HEADER,
            Self::Legacy => &LEGACY_HEADER,
        }
    }

    const fn layout(self) -> Layout {
        match self {
            Self::Tagged => Layout {
                level: Some(1),
                file: 2,
                line: 3,
                column: 4,
            },
            Self::Legacy => Layout {
                level: None,
                file: 1,
                line: 2,
                column: 3,
            },
        }
    }
}

/// Parse raw compiler output.
///
/// Never fails: text without any header yields an empty list, and an entry
/// whose line or column is not a number is skipped.
#[must_use]
pub fn parse_output(raw: &str, grammar: Grammar) -> Vec<DiagnosticRecord> {
    let text = strip_terminal_escapes(raw);
    let headers: Vec<Captures<'_>> = grammar.header().captures_iter(&text).collect();
    let layout = grammar.layout();

    let mut records = Vec::with_capacity(headers.len());
    for (index, caps) in headers.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let body_end = headers
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |next| next.start());
        let message = text[whole.end()..body_end].trim_end_matches(['\r', '\n']);

        match record_from(caps, &layout, message) {
            Some(record) => records.push(record),
            None => {
                tracing::debug!(header = whole.as_str().trim_end(), "Dropping malformed diagnostic entry");
            }
        }
    }
    records
}

fn record_from(caps: &Captures<'_>, layout: &Layout, message: &str) -> Option<DiagnosticRecord> {
    let severity = match layout.level {
        Some(group) => Severity::from_tag(caps.get(group)?.as_str())?,
        None => Severity::Error,
    };
    let file = caps.get(layout.file)?.as_str();
    let line = caps.get(layout.line)?.as_str().trim().parse::<u32>().ok()?;
    let column = caps.get(layout.column)?.as_str().trim().parse::<u32>().ok()?;
    Some(DiagnosticRecord::new(file, line, column, message, severity))
}
