//! Command-line surface tests

use assert_cmd::Command;
use predicates::prelude::*;

fn nbacross_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("nbacross").expect("binary built");
    cmd.current_dir(dir).env("NBACROSS_HOME", dir.join("no-global-home"));
    cmd
}

#[test]
fn help_command_always_works() {
    let dir = tempfile::tempdir().unwrap();
    nbacross_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run").and(predicate::str::contains("--list")));
}

#[test]
fn version_command_works() {
    let dir = tempfile::tempdir().unwrap();
    nbacross_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn list_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let first = nbacross_cmd(dir.path()).arg("--list").output().unwrap();
    let second = nbacross_cmd(dir.path()).arg("--list").output().unwrap();

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn list_and_dry_run_are_exclusive() {
    let dir = tempfile::tempdir().unwrap();
    nbacross_cmd(dir.path())
        .args(["--list", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn leading_driver_flags_need_no_separator() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("nbadet"), "").unwrap();
    nbacross_cmd(dir.path())
        .args(["--dry-run", "--tool", "./nbadet", "--driver", "autcross", "--timeout=10"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("--timeout=10\n"));
}
