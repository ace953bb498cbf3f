//! End-to-end CLI tests, driving the real `xcc` binary over fixture source
//! files through spec §8's concrete scenarios.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn xcc_bin() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_xcc"))
}

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn help_flag_prints_usage() {
    let mut cmd = Command::new(xcc_bin());
    cmd.arg("-h");
    cmd.assert().success().stdout(predicate::str::contains("USAGE"));
}

#[test]
fn version_flag_prints_version() {
    let mut cmd = Command::new(xcc_bin());
    cmd.arg("-v");
    cmd.assert().success().stdout(predicate::str::contains("xcc"));
}

#[test]
fn missing_input_is_an_error() {
    let mut cmd = Command::new(xcc_bin());
    cmd.assert().failure().stderr(predicate::str::contains("no input file"));
}

#[test]
fn scenario_1_global_assignment_compiles_to_out_xc() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "global.xc.src", "int x; int main() { x = 2 + 3 * 4; return 0; }");
    let output = dir.path().join("out.xc");

    let mut cmd = Command::new(xcc_bin());
    cmd.arg(&input).arg("-o").arg(&output);
    cmd.assert().success();

    let assembly = fs::read_to_string(&output).unwrap();
    assert!(assembly.contains("PUSH"));
    assert!(assembly.contains("HALT"));
}

#[test]
fn scenario_5_undefined_callee_fails_with_diagnostic() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "undef.xc.src", "int f() { return g(); }");
    let output = dir.path().join("out.xc");

    let mut cmd = Command::new(xcc_bin());
    cmd.arg(&input).arg("-o").arg(&output);
    cmd.assert().failure().stderr(predicate::str::contains("error"));

    assert!(!output.exists(), "no assembly should be written on failure");
}

#[test]
fn dump_flags_print_requested_sections() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "loop.xc.src", "int main() { int i; for (i=0; i<3; i=i+1) { } return 0; }");
    let output = dir.path().join("out.xc");

    let mut cmd = Command::new(xcc_bin());
    cmd.arg(&input).arg("-o").arg(&output).arg("-dump-tokens").arg("-dump-code");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("-- tokens --"))
        .stdout(predicate::str::contains("-- code --"));
}

#[test]
fn custom_output_path_is_respected() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "simple.xc.src", "int main() { return 0; }");
    let custom = dir.path().join("nested").join("program.xc");
    fs::create_dir_all(custom.parent().unwrap()).unwrap();

    let mut cmd = Command::new(xcc_bin());
    cmd.arg(&input).arg("-o").arg(&custom);
    cmd.assert().success();

    assert!(custom.exists());
}

#[test]
fn unknown_flag_is_rejected() {
    let mut cmd = Command::new(xcc_bin());
    cmd.arg("--bogus").arg("foo.xc.src");
    cmd.assert().failure();
}
