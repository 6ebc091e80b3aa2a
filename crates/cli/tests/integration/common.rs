//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Stand-in for `cf`: logs every invocation and keeps a copy of the pushed
/// manifest. `service-brokers` lists one broker at `FAKE_BROKER_URL`.
const FAKE_CF: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_CF_DIR/cf.log"
case "$1" in
  service-brokers)
    echo "Getting service brokers as admin..."
    echo
    echo "name       url"
    echo "brooklyn   $FAKE_BROKER_URL"
    ;;
  service)
    echo "guid-$2"
    ;;
  push)
    prev=""
    for arg in "$@"; do
      if [ "$prev" = "-f" ]; then
        cp "$arg" "$FAKE_CF_DIR/pushed.yml"
      fi
      prev="$arg"
    done
    ;;
esac
exit 0
"#;

/// Unreachable broker address.
pub const DEAD_BROKER_URL: &str = "http://127.0.0.1:9";

/// Isolated working directory with a fake `cf` and no profile.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("cf");
    std::fs::write(&script, FAKE_CF).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    Self { temp }
  }

  pub fn dir(&self) -> PathBuf {
    let p = self.temp.path().to_path_buf();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn read_file(&self, relative_path: &str) -> Option<String> {
    std::fs::read_to_string(self.temp.path().join(relative_path)).ok()
  }

  /// Every `cf` invocation so far, one per line.
  pub fn cf_log(&self) -> Vec<String> {
    self
      .read_file("cf.log")
      .map(|log| log.lines().map(str::to_string).collect())
      .unwrap_or_default()
  }

  /// Files left in the working directory.
  pub fn file_names(&self) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(self.temp.path())
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect();
    names.sort();
    names
  }

  /// A command running in the temp directory against the fake `cf`.
  ///
  /// The profile path points at a file that does not exist, and credential
  /// variables from the outer environment are cleared.
  pub fn cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("cf-brooklyn");
    cmd.current_dir(self.dir());
    cmd.env("CF_BROOKLYN_CF", self.dir().join("cf"));
    cmd.env("CF_BROOKLYN_CONFIG", self.dir().join("no-profile.yml"));
    cmd.env("FAKE_CF_DIR", self.dir());
    cmd.env("FAKE_BROKER_URL", DEAD_BROKER_URL);
    cmd.env_remove("CF_BROOKLYN_BROKER");
    cmd.env_remove("CF_BROOKLYN_USERNAME");
    cmd.env_remove("CF_BROOKLYN_PASSWORD");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
