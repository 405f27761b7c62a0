//! CLI surface smoke tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_every_command() {
    let mut cmd = Command::cargo_bin("wingman").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("testcases"))
        .stdout(predicate::str::contains("explain"))
        .stdout(predicate::str::contains("fix"))
        .stdout(predicate::str::contains("set-provider"))
        .stdout(predicate::str::contains("set-model"))
        .stdout(predicate::str::contains("set-api-key"))
        .stdout(predicate::str::contains("reset"));
}

#[test]
fn missing_subcommand_is_an_error() {
    let mut cmd = Command::cargo_bin("wingman").unwrap();
    cmd.assert().failure();
}

#[test]
fn ask_requires_a_file_argument() {
    let mut cmd = Command::cargo_bin("wingman").unwrap();
    cmd.arg("ask").assert().failure();
}
