//! Integration tests for the broker inspection commands.

use predicates::prelude::*;
use serial_test::serial;

use super::common::TestEnv;

#[test]
#[serial]
fn invoke_rejects_effector_without_type() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["invoke", "db", "restart"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("expected <entity-type>:<effector>"));

  assert!(env.cf_log().is_empty());
}

#[test]
#[serial]
fn invoke_rejects_unpaired_parameters() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["invoke", "db", "MySqlNode:restart", "--force"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("parameter --force has no value"));
}

#[test]
#[serial]
fn ready_reports_unreachable_broker() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["ready", "--broker", "brooklyn", "--username", "admin", "--password", "secret", "db"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to check db"));

  assert_eq!(env.cf_log(), vec!["service-brokers".to_string(), "service db --guid".to_string()]);
}

#[test]
#[serial]
fn credentials_come_from_profile() {
  let env = TestEnv::new();
  env.write_file("profile.yml", "broker: elsewhere\nusername: admin\npassword: secret\n");

  env
    .cmd()
    .env("CF_BROOKLYN_CONFIG", env.dir().join("profile.yml"))
    .args(["sensors", "db"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("service broker elsewhere not found"));
}

#[test]
#[serial]
fn add_catalog_requires_readable_file() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["add-catalog", "missing.yml"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to read missing.yml"));
}
