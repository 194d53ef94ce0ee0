//! Shared error types for the compiler pipeline.

use thiserror::Error;

use crate::diagnostic::Diagnostic;

/// The category of a reported diagnostic, printed as the `| <kind>:` line.
///
/// These are exactly the error kinds the language can produce; there is no
/// warning level because the compiler has no error recovery; the first
/// diagnostic raised aborts the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    StackUnderflow,
    TypeMismatch,
    StackOverflow,
    SyntaxError,
    WordError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::StackUnderflow => "stack underflow",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::StackOverflow => "stack overflow",
            ErrorKind::SyntaxError => "syntax error",
            ErrorKind::WordError => "word error",
        };
        f.write_str(s)
    }
}

/// A compile error carrying the diagnostic that should be printed to stderr.
///
/// Every lexer, parser and codegen failure is one of these: a single
/// diagnostic, because the pipeline aborts on the first error it hits.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CompileError(pub Diagnostic);

impl From<Diagnostic> for CompileError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(diagnostic)
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
