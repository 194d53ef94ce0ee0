//! IR emission: lowers a type-checked node stream to an LLVM module via
//! inkwell, the abstract "IR builder" of the core specification.

mod emitter;
mod error;
mod types;

pub use emitter::Emitter;
pub use error::{CodeGenError, Result};
pub use types::GenType;
