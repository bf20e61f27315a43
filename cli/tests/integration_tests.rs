//! End-to-end tests for the cinderc binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn print_ast_dumps_the_parse_tree() {
    let mut cmd = Command::cargo_bin("cinderc").unwrap();
    cmd.arg(fixture("globals.cin"))
        .arg("--print-ast")
        .assert()
        .success()
        .stdout(predicate::str::contains("Program:"))
        .stdout(predicate::str::contains("VarDecl: answer : int"))
        .stdout(predicate::str::contains("Constant: true"));
}

#[test]
fn print_ir_dumps_the_module() {
    let mut cmd = Command::cargo_bin("cinderc").unwrap();
    cmd.arg(fixture("main.cin"))
        .arg("--print-ir")
        .assert()
        .success()
        .stdout(predicate::str::contains("define i32 @main"))
        .stdout(predicate::str::contains("ret i32 100"));
}

#[test]
fn syntax_errors_exit_nonzero_with_a_diagnostic() {
    let mut cmd = Command::cargo_bin("cinderc").unwrap();
    cmd.arg(fixture("broken.cin"))
        .arg("--print-ast")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERROR"))
        .stderr(predicate::str::contains("ParserError"));
}

#[test]
fn missing_input_file_exits_nonzero() {
    let mut cmd = Command::cargo_bin("cinderc").unwrap();
    cmd.arg(fixture("does_not_exist.cin"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERROR"));
}

#[test]
fn print_flags_are_mutually_exclusive() {
    let mut cmd = Command::cargo_bin("cinderc").unwrap();
    cmd.arg(fixture("main.cin"))
        .arg("--print-ast")
        .arg("--print-ir")
        .assert()
        .failure();
}

#[test]
fn version_flag_prints_the_binary_name() {
    let mut cmd = Command::cargo_bin("cinderc").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cinderc"));
}

#[test]
fn log_level_none_silences_diagnostics() {
    let mut cmd = Command::cargo_bin("cinderc").unwrap();
    cmd.arg(fixture("broken.cin"))
        .arg("--print-ast")
        .arg("--log-level")
        .arg("none")
        .assert()
        .failure()
        .stderr(predicate::str::is_empty());
}

#[test]
fn compiles_and_runs_an_executable() {
    let dir = std::env::temp_dir().join(format!("cinderc_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let exe = dir.join("exit42");

    let mut cmd = Command::cargo_bin("cinderc").unwrap();
    cmd.arg(fixture("exit42.cin"))
        .arg("-o")
        .arg(&exe)
        .assert()
        .success();

    // The intermediate object is cleaned up after a successful link.
    let object = format!("{}.o", exe.display());
    assert!(!std::path::Path::new(&object).exists());

    let status = std::process::Command::new(&exe).status().unwrap();
    assert_eq!(status.code(), Some(42));

    std::fs::remove_dir_all(&dir).ok();
}
