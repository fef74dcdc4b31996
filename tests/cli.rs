//! CLI integration tests for the admin commands.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use collabsphere::store::{SqliteStore, Store};
use predicates::prelude::*;

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn init(&self) -> assert_cmd::assert::Assert {
        Command::cargo_bin("collabsphere")
            .expect("failed to find binary")
            .args([
                "admin",
                "init",
                "--data-dir",
                &self.data_dir_str(),
                "--non-interactive",
            ])
            .assert()
    }
}

#[test]
fn test_init_creates_database_secret_and_admin() {
    let ctx = TestContext::new();

    ctx.init()
        .success()
        .stdout(predicate::str::contains("Admin account"));

    assert!(ctx.data_dir().join("collabsphere.db").exists());
    assert!(ctx.data_dir().join(".jwt_secret").exists());

    let credentials_path = ctx.data_dir().join(".admin_credentials");
    assert!(credentials_path.exists());
    let credentials = std::fs::read_to_string(&credentials_path).expect("read credentials");
    let mut lines = credentials.lines();
    assert_eq!(lines.next(), Some("admin@collabsphere.local"));
    assert!(lines.next().is_some_and(|pw| !pw.is_empty()));

    let store =
        SqliteStore::new(ctx.data_dir().join("collabsphere.db")).expect("open database");
    assert!(store.has_admin_user().expect("query admin"));
}

#[test]
fn test_init_refuses_to_run_twice() {
    let ctx = TestContext::new();

    ctx.init().success();
    ctx.init()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn test_init_with_custom_admin_email() {
    let ctx = TestContext::new();

    Command::cargo_bin("collabsphere")
        .expect("failed to find binary")
        .args([
            "admin",
            "init",
            "--data-dir",
            &ctx.data_dir_str(),
            "--admin-email",
            "root@example.edu",
            "--non-interactive",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("root@example.edu"));
}

#[test]
fn test_serve_requires_init() {
    let ctx = TestContext::new();

    Command::cargo_bin("collabsphere")
        .expect("failed to find binary")
        .args(["serve", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}
