//! Driver for the `pilec` binary: wires the lexer, parser and IR emitter
//! together and implements the handful of output modes the CLI exposes.

mod cli;
mod error;

pub use cli::Cli;
pub use error::{DrvError, Result as DrvResult};

use std::path::Path;
use std::process::Command;

use inkwell::context::Context;
use inkwell::OptimizationLevel;

use pilec_gen::{CodeGenError, Emitter};
use pilec_lex::{Lexer, Token, TokenKind};
use pilec_par::{NodeKind, Parser as PileParser};
use pilec_util::{CompileError, Handler};

/// Runs the compiler per `cli`'s mode flags, returning the process exit
/// code: 0 on success, 1 on any compile diagnostic, 2 on a driver failure.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    let source = match std::fs::read_to_string(&cli.filename) {
        Ok(source) => source,
        Err(source) => {
            return Err(DrvError::ReadSource {
                path: cli.filename.display().to_string(),
                source,
            }
            .into())
        }
    };
    let file_name = cli.filename.display().to_string();
    tracing::debug!(file = %file_name, bytes = source.len(), "read source");

    let lexer = Lexer::new(file_name.clone(), &source);

    if cli.tokenize {
        return Ok(dump_tokens(lexer));
    }

    let nodes = PileParser::new(lexer);

    if cli.emit_nodes {
        return Ok(dump_nodes(nodes));
    }

    let context = Context::create();
    let mut emitter = Emitter::new(&context, &file_name);
    if let Err(err) = emitter.emit(nodes) {
        return Ok(report_codegen_error(err));
    }
    let module = emitter.into_module();
    tracing::debug!("IR emission complete");

    if cli.emit_llvm {
        let ir = module.print_to_string().to_string();
        match &cli.output {
            Some(path) => std::fs::write(path, ir).map_err(|source| DrvError::WriteOutput {
                path: path.display().to_string(),
                source,
            })?,
            None => println!("{}", ir),
        }
        return Ok(0);
    }

    if cli.compile {
        return compile_to_executable(&module, &cli.filename, cli.output.as_deref(), &cli.cc);
    }

    jit_run(&module)
}

/// Prints one line per token, matching the reference token dumper's format.
fn dump_tokens(lexer: Lexer<'_>) -> i32 {
    let handler = Handler::new();
    for result in lexer {
        match result {
            Ok(token) => println!(
                "{} `{}` at file \"{}\", row {} col {}",
                token_kind_label(token.kind),
                token.lexeme,
                token.pos.file,
                token.pos.row,
                token.pos.column,
            ),
            Err(CompileError(diagnostic)) => {
                handler.report(&diagnostic);
                return 1;
            }
        }
    }
    0
}

fn token_kind_label(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Int => "integer",
        TokenKind::Float => "float",
        TokenKind::String => "string",
        TokenKind::Word => "word",
    }
}

/// Prints one line per type-checked node; same shape as `dump_tokens` but
/// after the parser has resolved literal kinds and validated block nesting.
fn dump_nodes<I: Iterator<Item = pilec_util::Result<pilec_par::Node>>>(nodes: I) -> i32 {
    let handler = Handler::new();
    for result in nodes {
        match result {
            Ok(node) => {
                let token: &Token = &node.token;
                println!(
                    "{} `{}` at file \"{}\", row {} col {}",
                    node_kind_label(node.kind),
                    token.lexeme,
                    token.pos.file,
                    token.pos.row,
                    token.pos.column,
                );
            }
            Err(CompileError(diagnostic)) => {
                handler.report(&diagnostic);
                return 1;
            }
        }
    }
    0
}

fn node_kind_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Int => "integer",
        NodeKind::Float => "float",
        NodeKind::String => "string",
        NodeKind::Symbol => "symbol",
    }
}

fn report_codegen_error(err: CodeGenError) -> i32 {
    let handler = Handler::new();
    match err {
        CodeGenError::Compile(CompileError(diagnostic)) => {
            handler.report(&diagnostic);
            1
        }
        CodeGenError::Verification(message) => {
            eprintln!("pilec: internal error: {}", message);
            2
        }
    }
}

/// Writes `module` to a temporary `.ll` file next to the requested output,
/// shells out to `cc` to assemble and link a native executable, then
/// removes the intermediate file.
fn compile_to_executable(
    module: &inkwell::module::Module<'_>,
    filename: &Path,
    output: Option<&Path>,
    cc: &str,
) -> anyhow::Result<i32> {
    let output_base = output.map(Path::to_path_buf).unwrap_or_else(|| filename.to_path_buf());
    let ir_path = output_base.with_extension("ll");
    let exe_path = output_base.with_extension("");

    std::fs::write(&ir_path, module.print_to_string().to_string()).map_err(|source| DrvError::WriteOutput {
        path: ir_path.display().to_string(),
        source,
    })?;

    tracing::debug!(cc, ir = %ir_path.display(), exe = %exe_path.display(), "invoking C compiler");
    let status = Command::new(cc)
        .arg(&ir_path)
        .arg("-o")
        .arg(&exe_path)
        .status()
        .map_err(|source| DrvError::SpawnCc { cc: cc.to_string(), source })?;

    let _ = std::fs::remove_file(&ir_path);

    Ok(status.code().unwrap_or(1))
}

/// JIT-executes the module's `main` and returns its result as the exit code.
fn jit_run(module: &inkwell::module::Module<'_>) -> anyhow::Result<i32> {
    let engine = module
        .create_jit_execution_engine(OptimizationLevel::None)
        .map_err(|e| DrvError::Jit(e.to_string()))?;

    type MainFn = unsafe extern "C" fn() -> i32;
    let code = unsafe {
        let main_fn = engine
            .get_function::<MainFn>("main")
            .map_err(|e| DrvError::Jit(e.to_string()))?;
        main_fn.call()
    };
    Ok(code)
}
