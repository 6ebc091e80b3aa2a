//! CLI smoke tests for cf-brooklyn.
//!
//! These tests verify that the command surface parses and that failures
//! surface as non-zero exits with a readable message.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn brooklyn_cmd() -> Command {
  cargo_bin_cmd!("cf-brooklyn")
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  brooklyn_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  brooklyn_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("cf-brooklyn"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &[
    "push",
    "add-catalog",
    "delete-catalog",
    "effectors",
    "invoke",
    "sensors",
    "ready",
  ] {
    brooklyn_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

#[test]
fn push_help_mentions_manifest_flag() {
  brooklyn_cmd()
    .args(["push", "--help"])
    .assert()
    .success()
    .stdout(predicate::str::contains("--manifest"));
}

#[test]
fn unknown_subcommand_fails() {
  brooklyn_cmd().arg("frobnicate").assert().failure();
}

#[test]
fn sensors_requires_service() {
  brooklyn_cmd()
    .arg("sensors")
    .assert()
    .failure()
    .stderr(predicate::str::contains("<SERVICE>"));
}

// =============================================================================
// Error reporting
// =============================================================================

#[test]
fn push_without_manifest_reports_error() {
  let temp = TempDir::new().unwrap();

  brooklyn_cmd()
    .arg("push")
    .current_dir(temp.path())
    .env("CF_BROOKLYN_CONFIG", temp.path().join("none.yml"))
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("manifest.yml"));
}

#[test]
fn malformed_manifest_reports_parse_error() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("manifest.yml"), "applications: [\n").unwrap();

  brooklyn_cmd()
    .arg("push")
    .current_dir(temp.path())
    .env("CF_BROOKLYN_CONFIG", temp.path().join("none.yml"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to parse manifest"));
}

#[test]
fn malformed_profile_reports_error() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("profile.yml"), "brokr: typo\n").unwrap();

  brooklyn_cmd()
    .args(["ready", "db"])
    .env("CF_BROOKLYN_CONFIG", temp.path().join("profile.yml"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load configuration"));
}
