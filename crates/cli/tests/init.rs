// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;
use yare::parameterized;

#[test]
fn creates_work_dir() {
    let temp = TempDir::new().unwrap();

    run(&temp, &["init", "--owner", "user-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized liftlog"))
        .stdout(predicate::str::contains("Mode: local only"));

    assert!(temp.path().join(".liftlog/config.toml").exists());
    assert!(temp.path().join(".liftlog/workouts.db").exists());
    assert!(temp.path().join(".liftlog/.gitignore").exists());
}

#[test]
fn fails_if_already_initialized() {
    let temp = init_temp_local();

    run(&temp, &["init", "--owner", "user-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_into_path_argument() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("gym");
    std::fs::create_dir(&target).unwrap();

    run(&temp, &["init", "--owner", "user-1", target.to_str().unwrap()])
        .assert()
        .success();
    assert!(target.join(".liftlog").exists());
}

#[parameterized(
    http_scheme = { "http://sync.example.com" },
    no_host = { "ws://" },
    garbage = { "not a url" },
)]
fn rejects_invalid_remote(url: &str) {
    let temp = TempDir::new().unwrap();

    run(&temp, &["init", "--owner", "user-1", "--remote", url])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config error"));
    assert!(!temp.path().join(".liftlog").exists());
}

#[test]
fn commands_require_init() {
    let temp = TempDir::new().unwrap();

    run(&temp, &["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("liftlog init"));
}

#[test]
fn directory_flag_runs_elsewhere() {
    let temp = init_temp_local();
    let other = TempDir::new().unwrap();

    liftlog()
        .args(["-C", temp.path().to_str().unwrap(), "start", "Push"])
        .current_dir(other.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Started local_1"));
}
