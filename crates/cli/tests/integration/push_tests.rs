//! Push command integration tests.

use predicates::prelude::*;
use serial_test::serial;

use super::common::TestEnv;

const PLAIN_MANIFEST: &str = "applications:\n  - name: web\n    services: [db]\n";

const INLINE_MANIFEST: &str = r#"applications:
  - name: web
    brooklyn:
      - name: db
        location: aws
        services:
          - type: brooklyn.entity.database.mysql.MySqlNode
"#;

#[test]
#[serial]
fn plain_manifest_is_pushed_through() {
  let env = TestEnv::new();
  env.write_file("manifest.yml", PLAIN_MANIFEST);

  env
    .cmd()
    .args(["push", "web", "-i", "2"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Push complete"));

  let log = env.cf_log();
  assert_eq!(log.len(), 1, "unexpected cf calls: {:?}", log);
  assert!(log[0].starts_with("push web -i 2 -f "));
  assert!(log[0].ends_with(".temp.yml"));

  let pushed = env.read_file("pushed.yml").unwrap();
  assert!(pushed.contains("name: web"));
  assert_eq!(env.read_file("manifest.yml").unwrap(), PLAIN_MANIFEST);
}

#[test]
#[serial]
fn working_manifest_is_removed_after_push() {
  let env = TestEnv::new();
  env.write_file("manifest.yml", PLAIN_MANIFEST);

  env.cmd().arg("push").assert().success();

  assert!(env.file_names().iter().all(|name| !name.ends_with(".temp.yml")));
}

#[test]
#[serial]
fn manifest_flag_selects_file() {
  let env = TestEnv::new();
  env.write_file("deploy/other.yml", PLAIN_MANIFEST);

  env
    .cmd()
    .args(["push", "-f", "deploy/other.yml"])
    .assert()
    .success()
    .stdout(predicate::str::contains("other.yml"));

  assert!(env.cf_log()[0].contains("-f deploy/manifest."));
}

#[test]
#[serial]
fn missing_manifest_fails() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("push")
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to read manifest"));

  assert!(env.cf_log().is_empty());
}

#[test]
#[serial]
fn inline_services_need_credentials() {
  let env = TestEnv::new();
  env.write_file("manifest.yml", INLINE_MANIFEST);

  env
    .cmd()
    .arg("push")
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing broker credentials"));

  assert!(env.cf_log().is_empty());
  assert_eq!(env.read_file("manifest.yml").unwrap(), INLINE_MANIFEST);
}

#[test]
#[serial]
fn unknown_broker_aborts_before_provisioning() {
  let env = TestEnv::new();
  env.write_file("manifest.yml", INLINE_MANIFEST);

  env
    .cmd()
    .args(["push", "--broker", "other", "--username", "admin", "--password", "secret"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("service broker other not found"));

  assert_eq!(env.cf_log(), vec!["service-brokers".to_string()]);
}

#[test]
#[serial]
fn invalid_location_is_reported() {
  let env = TestEnv::new();
  env.write_file(
    "manifest.yml",
    "services:\n  - name: db\n    service: mysql\n    location: {aws: {}, gce: {}}\n",
  );

  env
    .cmd()
    .env("CF_BROOKLYN_BROKER", "brooklyn")
    .env("CF_BROOKLYN_USERNAME", "admin")
    .env("CF_BROOKLYN_PASSWORD", "secret")
    .arg("push")
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid location for service db"));

  assert!(env.cf_log().iter().all(|call| !call.starts_with("create-service")));
}
