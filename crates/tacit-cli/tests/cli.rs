//! Integration tests for the `tacit` binary.
//!
//! These invoke the binary as a subprocess and check exit codes, stdout
//! and stderr.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tacit() -> Command {
    Command::cargo_bin("tacit").unwrap()
}

/// Writes `body` wrapped in a `<program>` element into `dir`.
fn write_program(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("program.xml");
    fs::write(&path, format!("<program>{body}</program>")).unwrap();
    path
}

#[test]
fn no_args_prints_usage_and_fails() {
    tacit()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("usage: tacit"));
}

#[test]
fn help_flag_exits_zero() {
    tacit()
        .arg("--help")
        .assert()
        .success()
        .stderr(predicate::str::contains("usage: tacit"));
}

#[test]
fn missing_program_file_fails() {
    tacit()
        .arg("no-such-file.xml")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading"));
}

#[test]
fn runs_a_program_to_stdout() {
    let dir = TempDir::new().unwrap();
    let program = write_program(
        &dir,
        r#"<instruction order="1" opcode="WRITE"><arg1 type="string">hello\032world</arg1></instruction>"#,
    );
    tacit().arg(program).assert().success().stdout("hello world");
}

#[test]
fn exit_opcode_sets_the_process_code() {
    let dir = TempDir::new().unwrap();
    let program = write_program(
        &dir,
        r#"<instruction order="1" opcode="EXIT"><arg1 type="int">7</arg1></instruction>"#,
    );
    tacit().arg(program).assert().failure().code(7);
}

#[test]
fn reads_from_stdin() {
    let dir = TempDir::new().unwrap();
    let program = write_program(
        &dir,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@n</arg1></instruction>
           <instruction order="2" opcode="READ"><arg1 type="var">GF@n</arg1><arg2 type="type">int</arg2></instruction>
           <instruction order="3" opcode="WRITE"><arg1 type="var">GF@n</arg1></instruction>"#,
    );
    tacit().arg(program).write_stdin("41\n").assert().success().stdout("41");
}

#[test]
fn reads_from_an_input_file() {
    let dir = TempDir::new().unwrap();
    let program = write_program(
        &dir,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@s</arg1></instruction>
           <instruction order="2" opcode="READ"><arg1 type="var">GF@s</arg1><arg2 type="type">string</arg2></instruction>
           <instruction order="3" opcode="WRITE"><arg1 type="var">GF@s</arg1></instruction>"#,
    );
    let input = dir.path().join("input.txt");
    fs::write(&input, "from a file\n").unwrap();
    tacit().arg(program).arg(input).assert().success().stdout("from a file");
}

#[test]
fn structure_error_exits_32() {
    let dir = TempDir::new().unwrap();
    let program = write_program(&dir, r#"<instruction order="1" opcode="NOP"></instruction>"#);
    tacit()
        .arg(program)
        .assert()
        .failure()
        .code(32)
        .stderr(predicate::str::contains("source-structure"));
}

#[test]
fn runtime_error_exits_with_the_taxonomy_code() {
    let dir = TempDir::new().unwrap();
    let program = write_program(
        &dir,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
           <instruction order="2" opcode="IDIV"><arg1 type="var">GF@x</arg1><arg2 type="int">1</arg2><arg3 type="int">0</arg3></instruction>"#,
    );
    tacit()
        .arg(program)
        .assert()
        .failure()
        .code(57)
        .stderr(predicate::str::contains("division by zero"));
}

#[test]
fn dprint_goes_to_stderr_not_stdout() {
    let dir = TempDir::new().unwrap();
    let program = write_program(
        &dir,
        r#"<instruction order="1" opcode="DPRINT"><arg1 type="string">debug</arg1></instruction>
           <instruction order="2" opcode="WRITE"><arg1 type="string">out</arg1></instruction>"#,
    );
    tacit()
        .arg(program)
        .assert()
        .success()
        .stdout("out")
        .stderr(predicate::str::contains("debug"));
}
