//! End-to-end runs of the `tinyc` binary

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn write_source(name: &str, source: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tinyc-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, source).unwrap();
    path
}

fn tinyc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tinyc"))
        .args(args)
        .output()
        .unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn test_clean_file_exits_zero() {
    let path = write_source("clean.tiny", "let x = 1;\nprint x + 1;\n");
    let output = tinyc(&[path.to_str().unwrap()]);
    assert_eq!(stderr(&output), "");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_malformed_statement_exits_one() {
    let path = write_source("malformed.tiny", "let x = 1;\nprint x;\nlet = 3;\n");
    let output = tinyc(&[path.to_str().unwrap()]);
    assert_eq!(
        stderr(&output),
        "3:5: unexpected token '=', expected 'IDENTIFIER'\n"
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_each_file_is_its_own_unit() {
    let bad = write_source("bad.tiny", "print missing;\n");
    let good = write_source("good.tiny", "print 1;\n");
    let output = tinyc(&[bad.to_str().unwrap(), good.to_str().unwrap()]);
    assert_eq!(stderr(&output), "1:7: use of undeclared variable 'missing'\n");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_input_is_not_a_diagnostic() {
    let output = tinyc(&["/nonexistent/input.tiny"]);
    assert!(stderr(&output).starts_with("error: cannot read /nonexistent/input.tiny"));
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_help_reports_nothing() {
    let output = tinyc(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout.clone()).unwrap().contains("Usage"));
    assert_eq!(stderr(&output), "");
}
