//! Tests for the inspection modes: `--tokenize`, `--emit-nodes` and
//! `--emit-llvm`, none of which run the program.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn pile_file(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".pile").expect("create temp file");
    file.write_all(source.as_bytes()).expect("write source");
    file
}

fn pilec() -> Command {
    Command::cargo_bin("pilec").expect("find pilec binary")
}

#[test]
fn tokenize_prints_one_line_per_token() {
    let file = pile_file("2 3 +\n");
    pilec()
        .arg("--tokenize")
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("integer `2`")
                .and(predicate::str::contains("integer `3`"))
                .and(predicate::str::contains("word `+`")),
        );
}

#[test]
fn tokenize_reports_a_lexer_error_for_unterminated_strings() {
    let file = pile_file("\"unterminated\n");
    pilec()
        .arg("--tokenize")
        .arg(file.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unterminated string"));
}

#[test]
fn emit_nodes_resolves_literal_kinds() {
    let file = pile_file("2 3 + dump\n");
    pilec()
        .arg("--emit-nodes")
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("integer `2`")
                .and(predicate::str::contains("symbol `+`")),
        );
}

#[test]
fn emit_llvm_prints_a_textual_module() {
    let file = pile_file("2 3 + dump\n");
    pilec()
        .arg("--emit-llvm")
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("define i32 @main()")
                .and(predicate::str::contains("declare i32 @printf")),
        );
}

#[test]
fn emit_llvm_with_output_writes_to_file() {
    let file = pile_file("2 3 + dump\n");
    let out = NamedTempFile::with_suffix(".ll").expect("create temp output");
    pilec()
        .arg("--emit-llvm")
        .arg("--output")
        .arg(out.path())
        .arg(file.path())
        .assert()
        .success()
        .stdout("");

    let written = std::fs::read_to_string(out.path()).expect("read emitted IR");
    assert!(written.contains("define i32 @main()"));
}
