// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Nothing listens here, so connections are refused immediately.
pub const UNREACHABLE_REMOTE: &str = "ws://127.0.0.1:1";

pub fn liftlog() -> Command {
    let mut cmd = cargo_bin_cmd!("liftlog");
    cmd.env_remove("LIFTLOG_LOG");
    cmd
}

/// Run liftlog inside `temp` with the given arguments.
pub fn run(temp: &TempDir, args: &[&str]) -> Command {
    let mut cmd = liftlog();
    cmd.args(args).current_dir(temp.path());
    cmd
}

/// Helper to create an initialized temp directory in local-only mode
pub fn init_temp_local() -> TempDir {
    let temp = TempDir::new().unwrap();
    liftlog()
        .args(["init", "--owner", "user-1"])
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Helper to create an initialized temp directory with a remote configured
pub fn init_temp_remote(url: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    liftlog()
        .args(["init", "--owner", "user-1", "--remote", url])
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Pull the first `local_N` or remote id out of a command's stdout.
fn first_id(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout)
        .split_whitespace()
        .map(|s| s.trim_end_matches(':'))
        .find(|s| s.starts_with("local_") || s.starts_with("wo-") || s.starts_with("set-"))
        .unwrap()
        .to_string()
}

/// Start a workout and return its id
pub fn start_workout(temp: &TempDir, name: &str) -> String {
    let output = run(temp, &["start", name, "--offline"]).output().unwrap();
    assert!(output.status.success());
    first_id(&output.stdout)
}

/// Log a set under a workout and return the set's id
pub fn add_set(temp: &TempDir, workout: &str, exercise: &str, reps: u32) -> String {
    let reps = reps.to_string();
    let output = run(
        temp,
        &["set", "add", workout, exercise, "-r", &reps, "--offline"],
    )
    .output()
    .unwrap();
    assert!(output.status.success());
    first_id(&output.stdout)
}
