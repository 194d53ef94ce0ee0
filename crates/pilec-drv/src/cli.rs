//! Command-line surface for the `pilec` binary.

use std::path::PathBuf;

use clap::Parser;

/// Pile compiler and JIT driver.
///
/// With no mode flag, `pilec` lexes, type-checks, compiles and then
/// JIT-executes the given source file, exiting with whatever code its
/// `main` returns.
#[derive(Parser, Debug)]
#[command(name = "pilec")]
#[command(author = "Pile Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile and run Pile programs", long_about = None)]
pub struct Cli {
    /// Source file to compile.
    pub filename: PathBuf,

    /// Output file path (used by --emit-llvm and --compile).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compile to a native executable instead of running it.
    #[arg(short = 'c', long)]
    pub compile: bool,

    /// Print the token stream and exit.
    #[arg(short = 't', long)]
    pub tokenize: bool,

    /// Print the type-checked node stream and exit.
    #[arg(long)]
    pub emit_nodes: bool,

    /// Print the generated LLVM IR instead of running it.
    #[arg(short = 'e', long)]
    pub emit_llvm: bool,

    /// C compiler driver used by --compile.
    #[arg(long, default_value = "clang", env = "PILEC_CC")]
    pub cc: String,

    /// Enable verbose driver logging.
    #[arg(short, long, global = true, env = "PILEC_VERBOSE")]
    pub verbose: bool,
}
