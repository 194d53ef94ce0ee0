//! Tests for `--compile`, which shells out to an external C compiler.
//! Skipped entirely when no such compiler is on `PATH` in the test
//! environment, since this mode's correctness is bounded by the external
//! tool, not by anything this crate controls.

use std::io::Write;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use tempfile::NamedTempFile;

fn pile_file(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".pile").expect("create temp file");
    file.write_all(source.as_bytes()).expect("write source");
    file
}

/// Only `clang` understands `.ll` textual IR directly; `gcc`/`cc` can't
/// compile it, so there is no fallback here.
fn available_cc() -> Option<&'static str> {
    if StdCommand::new("clang").arg("--version").output().map(|o| o.status.success()).unwrap_or(false) {
        Some("clang")
    } else {
        None
    }
}

#[test]
fn compile_produces_a_runnable_executable() {
    let Some(cc) = available_cc() else {
        eprintln!("skipping: no C compiler found on PATH");
        return;
    };

    let source = pile_file("2 3 + dump\n");
    let exe = NamedTempFile::new().expect("create temp exe path");
    let exe_path = exe.path().to_path_buf();
    drop(exe);

    Command::cargo_bin("pilec")
        .expect("find pilec binary")
        .arg("--compile")
        .arg("--cc")
        .arg(cc)
        .arg("--output")
        .arg(&exe_path)
        .arg(source.path())
        .assert()
        .success();

    assert!(exe_path.exists(), "expected {:?} to be produced", exe_path);
    assert!(!exe_path.with_extension("ll").exists(), "intermediate .ll should be removed");

    let output = StdCommand::new(&exe_path).output().expect("run compiled executable");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "5\n");

    let _ = std::fs::remove_file(&exe_path);
}
