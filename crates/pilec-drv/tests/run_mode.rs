//! End-to-end tests for the default (JIT-execute) mode, covering the
//! observable behaviours a runnable program must have.

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
fn integer_arithmetic_prints_the_sum() {
    let file = pile_file("2 3 + dump\n");
    pilec()
        .arg(file.path())
        .assert()
        .success()
        .stdout("5\n");
}

#[test]
fn float_arithmetic_prints_with_six_decimal_places() {
    let file = pile_file("1.5 2.5 + dump\n");
    pilec()
        .arg(file.path())
        .assert()
        .success()
        .stdout("4.000000\n");
}

#[test]
fn comparison_drives_the_taken_branch() {
    let file = pile_file("3 2 > if 1 dump else 0 dump end\n");
    pilec()
        .arg(file.path())
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn loop_prints_each_iteration() {
    let file = pile_file("0 while dup 3 < do dup dump 1 + end drop\n");
    pilec()
        .arg(file.path())
        .assert()
        .success()
        .stdout("0\n1\n2\n");
}

#[test]
fn swap_reorders_the_top_two_values() {
    let file = pile_file("1 2 swap dump dump\n");
    pilec()
        .arg(file.path())
        .assert()
        .success()
        .stdout("1\n2\n");
}

#[test]
fn type_mismatch_reports_a_diagnostic_and_fails() {
    let file = pile_file("1 1.0 +\n");
    pilec()
        .arg(file.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("type mismatch"));
}

#[test]
fn unterminated_block_reports_a_syntax_error() {
    let file = pile_file("1 1 = if 2 dump\n");
    pilec()
        .arg(file.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unterminated `if` block"));
}

#[test]
fn unknown_word_reports_a_word_error() {
    let file = pile_file("foo\n");
    pilec()
        .arg(file.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown operation or defined identifier `foo`"));
}

#[test]
fn missing_source_file_is_a_driver_error_not_a_diagnostic() {
    pilec()
        .arg("/no/such/file.pile")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("could not read"));
}
