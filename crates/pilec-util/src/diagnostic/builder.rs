//! Fluent construction of [`Diagnostic`]s, mirroring the builder style used
//! throughout the rest of the pipeline for multi-field value construction.

use super::Diagnostic;
use crate::error::ErrorKind;
use crate::span::Position;

pub struct DiagnosticBuilder {
    kind: ErrorKind,
    position: Position,
    message: String,
    note: Option<String>,
}

impl DiagnosticBuilder {
    pub fn new(kind: ErrorKind, position: Position, message: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            message: message.into(),
            note: None,
        }
    }

    pub fn stack_underflow(position: Position, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StackUnderflow, position, message)
    }

    pub fn type_mismatch(position: Position, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch, position, message)
    }

    pub fn stack_overflow(position: Position, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StackOverflow, position, message)
    }

    pub fn syntax_error(position: Position, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, position, message)
    }

    pub fn word_error(position: Position, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WordError, position, message)
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn build(self) -> Diagnostic {
        let mut diag = Diagnostic::new(self.kind, self.position, self.message);
        diag.note = self.note;
        diag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_requested_kind() {
        let diag = DiagnosticBuilder::type_mismatch(Position::dummy(), "expected int")
            .note("check the operand types")
            .build();
        assert_eq!(diag.kind, ErrorKind::TypeMismatch);
        assert_eq!(diag.note.as_deref(), Some("check the operand types"));
    }
}
