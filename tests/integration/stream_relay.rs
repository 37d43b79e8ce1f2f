//! Standard stream relay integration tests
//!
//! Verifies the running harness passes the driver's streams through:
//! - driver stdout on our stdout, driver stderr on our stderr
//! - our stdin reaches the driver, in order, and is closed after
//! - the driver's exit status becomes ours
#![cfg(unix)]

use super::harness::{nbacross, nbacross_with_env, nbacross_with_stdin, Fixture, NbacrossAssertions};
use std::collections::HashMap;

#[test]
fn driver_streams_land_on_matching_streams() {
    let fixture = Fixture::load("echo-driver");
    let result = nbacross(&fixture, &[]);

    result.assert_success();
    assert!(result.stderr_contains("driver: started"));
    assert!(result.stderr_contains("driver: done"));
    assert!(!result.stdout_contains("driver: "));
    assert!(
        result
            .stdout
            .lines()
            .all(|l| l.starts_with("arg: ") || l.starts_with("stdin: ")),
        "stdout should only carry driver output:\n{}",
        result.stdout
    );
}

#[test]
fn driver_exit_code_is_propagated() {
    let fixture = Fixture::load("echo-driver");
    let mut env = HashMap::new();
    env.insert("FAKE_DRIVER_EXIT".to_string(), "3".to_string());

    let result = nbacross_with_env(&fixture, &[], env);

    result.assert_exit_code(3);
    assert!(result.stderr_contains("Driver exited with status 3"));
}

#[test]
fn stdin_is_forwarded_in_order() {
    let fixture = Fixture::load("echo-driver");
    let result = nbacross_with_stdin(&fixture, &[], b"G a\nF b\nGF (a & b)\n");

    result.assert_success();
    let forwarded: Vec<&str> = result
        .stdout
        .lines()
        .filter_map(|l| l.strip_prefix("stdin: "))
        .collect();
    assert_eq!(forwarded, vec!["G a", "F b", "GF (a & b)"]);
}

#[test]
fn large_stdin_arrives_complete() {
    let fixture = Fixture::load("echo-driver");
    let input: String = (0..2000).map(|i| format!("formula-{}\n", i)).collect();

    let result = nbacross_with_stdin(&fixture, &[], input.as_bytes());

    result.assert_success();
    let forwarded: Vec<&str> = result
        .stdout
        .lines()
        .filter_map(|l| l.strip_prefix("stdin: "))
        .collect();
    assert_eq!(forwarded.len(), 2000);
    assert_eq!(forwarded[0], "formula-0");
    assert_eq!(forwarded[1999], "formula-1999");
}

#[test]
fn empty_stdin_still_completes() {
    // The fake driver reads stdin to EOF before exiting
    let fixture = Fixture::load("echo-driver");
    let result = nbacross_with_stdin(&fixture, &[], b"");

    result.assert_success();
    assert!(!result.stdout_contains("stdin: "));
    assert!(result.stderr_contains("driver: done"));
}
