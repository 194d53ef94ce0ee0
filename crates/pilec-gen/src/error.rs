//! Error types for IR generation.

use thiserror::Error;

use pilec_util::CompileError;

/// Either a located source diagnostic (propagated from lexing/parsing, or
/// raised directly by the emitter for an unrecognized word) or an internal
/// failure in the IR builder itself.
#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("LLVM module verification failed: {0}")]
    Verification(String),
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
