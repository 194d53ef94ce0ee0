//! Diagnostic reporting.
//!
//! Every error the compiler can raise — lexer, parser/type-checker, or IR
//! emitter — becomes a single [`Diagnostic`] printed to stderr in exactly
//! the shape the reference implementation's `throw`/`indent`/
//! `break_line_at` helpers produce:
//!
//! ```text
//! pile: error at <file>:<row>:<col>:
//!   | <kind>:
//!   |    <message, wrapped to ~50 columns>
//! + <note, wrapped to ~50 columns>
//! ```
//!
//! The note line is only printed when the diagnostic carries one.

mod builder;

pub use builder::DiagnosticBuilder;

use std::cell::Cell;
use std::fmt;

use crate::error::ErrorKind;
use crate::span::Position;

/// Column width message and note bodies are wrapped to.
const WRAP_WIDTH: usize = 50;

/// A single compiler diagnostic.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub position: Position,
    pub message: String,
    pub note: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, position: Position, message: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            message: message.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = vec![
            format!("pile: error at {}:", self.position),
            format!("  | {}:", self.kind),
        ];
        lines.extend(
            wrap(&self.message, WRAP_WIDTH)
                .into_iter()
                .map(|line| format!("  |    {}", line)),
        );
        if let Some(note) = &self.note {
            lines.extend(wrap(note, WRAP_WIDTH).into_iter().map(|line| format!("  + {}", line)));
        }
        f.write_str(&lines.join("\n"))
    }
}

impl std::error::Error for Diagnostic {}

/// Greedy word-wrap, never splitting a word even if it exceeds `width`.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Reports diagnostics to stderr.
///
/// The language has no error recovery: the first diagnostic reported is the
/// only one that matters, so the handler's job is just to remember that it
/// happened, not to accumulate a list.
pub struct Handler {
    reported: Cell<bool>,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            reported: Cell::new(false),
        }
    }

    /// Print a diagnostic to stderr.
    pub fn report(&self, diagnostic: &Diagnostic) {
        self.reported.set(true);
        eprintln!("{}", diagnostic);
    }

    pub fn has_reported(&self) -> bool {
        self.reported.get()
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new("main.pile", 3, 7)
    }

    #[test]
    fn display_matches_reference_format() {
        let diag = Diagnostic::new(ErrorKind::StackUnderflow, pos(), "not enough values on the stack");
        let rendered = diag.to_string();
        assert!(rendered.starts_with("pile: error at main.pile:3:7:\n"));
        assert!(rendered.contains("  | stack underflow:\n"));
        assert!(rendered.contains("  |    not enough values on the stack"));
    }

    #[test]
    fn note_is_appended_with_plus_prefix() {
        let diag = Diagnostic::new(ErrorKind::TypeMismatch, pos(), "expected int, found float")
            .with_note("dump requires a single typed value");
        let rendered = diag.to_string();
        assert!(rendered.contains("+ dump requires a single typed value"));
    }

    #[test]
    fn long_message_wraps_at_width() {
        let long = "alpha ".repeat(20);
        let diag = Diagnostic::new(ErrorKind::WordError, pos(), long);
        let rendered = diag.to_string();
        for line in rendered.lines().filter(|l| l.starts_with("  |    ")) {
            assert!(line.len() <= WRAP_WIDTH + "  |    ".len());
        }
    }

    #[test]
    fn handler_tracks_whether_it_reported() {
        let handler = Handler::new();
        assert!(!handler.has_reported());
        handler.report(&Diagnostic::new(ErrorKind::SyntaxError, pos(), "unexpected token"));
        assert!(handler.has_reported());
    }
}
