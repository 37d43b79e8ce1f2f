//! Signal forwarding integration tests
//!
//! The driver runs in its own process group. Signals sent to nbacross must
//! reach it, and nbacross must not exit while the driver is still running.
#![cfg(unix)]

use super::harness::{spawn_nbacross, Fixture};
use std::path::Path;
use std::process::{Child, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

/// Wait for the fake driver to write its pid
fn driver_pid(fixture: &Fixture) -> libc::pid_t {
    let pid_file = fixture.path.join("driver.pid");
    let deadline = Instant::now() + Duration::from_secs(10);

    loop {
        if let Some(pid) = read_pid(&pid_file) {
            return pid;
        }
        assert!(Instant::now() < deadline, "driver never started");
        thread::sleep(Duration::from_millis(20));
    }
}

fn read_pid(path: &Path) -> Option<libc::pid_t> {
    let content = std::fs::read_to_string(path).ok()?;
    content.strip_suffix('\n')?.parse().ok()
}

fn alive(pid: libc::pid_t) -> bool {
    // SAFETY: signal 0 only checks that the process exists
    unsafe { libc::kill(pid, 0) == 0 }
}

fn send(child: &Child, signal: libc::c_int) {
    // SAFETY: plain kill(2) on a process we spawned
    unsafe {
        libc::kill(child.id() as libc::pid_t, signal);
    }
}

/// Wait for nbacross to exit; kill everything and fail if it does not
fn wait_or_fail(mut child: Child, driver: libc::pid_t) -> ExitStatus {
    let deadline = Instant::now() + Duration::from_secs(20);

    loop {
        if let Some(status) = child.try_wait().expect("Failed to poll nbacross") {
            return status;
        }
        if Instant::now() >= deadline {
            child.kill().ok();
            // SAFETY: cleaning up the fake driver's group
            unsafe {
                libc::killpg(driver, libc::SIGKILL);
            }
            panic!("nbacross did not exit after being signalled");
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn assert_signal_stops_driver(signal: libc::c_int) {
    let fixture = Fixture::load_mutable("sleepy-driver");
    let child = spawn_nbacross(&fixture, &[]);
    let driver = driver_pid(&fixture);
    assert!(alive(driver));

    send(&child, signal);
    let status = wait_or_fail(child, driver);

    // The driver got SIGINT and its status is ours
    assert_eq!(status.code(), Some(128 + libc::SIGINT));
    assert!(!alive(driver), "driver {} outlived nbacross", driver);
}

#[test]
fn sigterm_stops_the_driver() {
    assert_signal_stops_driver(libc::SIGTERM);
}

#[test]
fn sighup_stops_the_driver() {
    assert_signal_stops_driver(libc::SIGHUP);
}

#[test]
fn sigint_stops_the_driver() {
    assert_signal_stops_driver(libc::SIGINT);
}

#[test]
fn driver_runs_in_its_own_process_group() {
    let fixture = Fixture::load_mutable("sleepy-driver");
    let child = spawn_nbacross(&fixture, &[]);
    let driver = driver_pid(&fixture);

    // SAFETY: getpgid only reads process state
    let group = unsafe { libc::getpgid(driver) };
    assert_eq!(group, driver);

    send(&child, libc::SIGTERM);
    wait_or_fail(child, driver);
}
