//! Driver-level error type.
//!
//! Diagnostics from the lex/parse/codegen pipeline carry their own exact
//! stderr rendering ([`pilec_util::Diagnostic`]) and never pass through
//! here; this type is only for failures the pipeline itself can't explain,
//! like a missing input file or a C compiler that won't launch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrvError {
    #[error("could not read \"{path}\": {source}")]
    ReadSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write \"{path}\": {source}")]
    WriteOutput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch C compiler \"{cc}\": {source}")]
    SpawnCc {
        cc: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JIT execution failed: {0}")]
    Jit(String),
}

pub type Result<T> = std::result::Result<T, DrvError>;
