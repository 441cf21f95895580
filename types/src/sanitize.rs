//! Terminal escape stripping for compiler output.
//!
//! The compiler colours its output when it believes it is talking to a
//! terminal. Colour codes sit between the level tag and the location, so they
//! have to go before any pattern matching happens.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

/// ASCII escape character that starts ANSI sequences.
const ESC: char = '\x1b';
/// ASCII bell character that can terminate OSC sequences.
const BEL: char = '\x07';
/// Single-byte C1 form of `ESC [`.
const C1_CSI: char = '\u{009b}';

/// Remove ANSI escape sequences (CSI, OSC, DCS and two-byte forms).
///
/// Ordinary text, including `\n`, `\r` and `\t`, is passed through untouched.
/// Returns `Cow::Borrowed` when the input has no escapes, which is the common
/// case for output captured through a pipe.
///
/// ```
/// use reds_types::strip_terminal_escapes;
///
/// assert_eq!(strip_terminal_escapes("plain"), "plain");
/// assert_eq!(
///     strip_terminal_escapes("\x1b[31m[ERROR]\x1b[0m At a.reds:1:1:"),
///     "[ERROR] At a.reds:1:1:"
/// );
/// ```
#[must_use]
pub fn strip_terminal_escapes(input: &str) -> Cow<'_, str> {
    if !input.contains([ESC, C1_CSI]) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESC => skip_escape(&mut chars),
            C1_CSI => skip_csi(&mut chars),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Skip the remainder of a sequence whose `ESC` was already consumed.
fn skip_escape(chars: &mut Peekable<Chars<'_>>) {
    let Some(&next) = chars.peek() else {
        return;
    };
    match next {
        '[' => {
            chars.next();
            skip_csi(chars);
        }
        ']' => {
            chars.next();
            skip_until_terminator(chars, true);
        }
        'P' | '^' | '_' | 'X' => {
            chars.next();
            skip_until_terminator(chars, false);
        }
        // Charset designation and friends carry one argument character.
        '(' | ')' | '*' | '+' | '#' | ' ' => {
            chars.next();
            chars.next();
        }
        // Any other final byte is a complete two-character sequence.
        '\x30'..='\x7e' => {
            chars.next();
        }
        _ => {}
    }
}

/// CSI: parameter and intermediate bytes (0x20-0x3F) up to a final byte (0x40-0x7E).
fn skip_csi(chars: &mut Peekable<Chars<'_>>) {
    while let Some(&c) = chars.peek() {
        match c {
            '\x20'..='\x3f' => {
                chars.next();
            }
            '\x40'..='\x7e' => {
                chars.next();
                return;
            }
            _ => return,
        }
    }
}

/// String sequences end with ST (`ESC \`); OSC may also end with BEL.
fn skip_until_terminator(chars: &mut Peekable<Chars<'_>>, bel_terminates: bool) {
    while let Some(c) = chars.next() {
        if bel_terminates && c == BEL {
            return;
        }
        if c == ESC && chars.peek() == Some(&'\\') {
            chars.next();
            return;
        }
    }
}
