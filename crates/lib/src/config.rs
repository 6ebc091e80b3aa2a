//! User profile configuration.
//!
//! The profile lives at `$XDG_CONFIG_HOME/cf-brooklyn/config.yml` (or the path
//! in `CF_BROOKLYN_CONFIG`). Every field is optional; environment variables
//! override the file.
//!
//! ```yaml
//! broker: my-broker
//! username: admin
//! password: secret
//! cf_binary: /usr/local/bin/cf
//! manifest: manifest.yml
//! poll_unit_ms: 1000
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_CF_BINARY, DEFAULT_MANIFEST, ENV_CF_BINARY, ENV_CONFIG};
use crate::credentials::PartialCredentials;
use crate::platform::paths::profile_path;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse config {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_yaml::Error },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub broker: Option<String>,
  pub username: Option<String>,
  pub password: Option<String>,
  pub cf_binary: Option<String>,
  pub manifest: Option<PathBuf>,
  pub poll_unit_ms: Option<u64>,
}

impl Config {
  /// Load the profile from its default location, then apply environment overrides.
  ///
  /// A missing profile file is not an error.
  pub fn load() -> Result<Self, ConfigError> {
    let path = std::env::var(ENV_CONFIG).ok().map(PathBuf::from).or_else(profile_path);
    let mut config = match path {
      Some(path) => Self::load_from(&path)?,
      None => Self::default(),
    };
    config.apply_env();
    Ok(config)
  }

  /// Load a profile file. Returns the default config if it doesn't exist.
  pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = ?path, "no profile found");
        return Ok(Self::default());
      }
      Err(source) => {
        return Err(ConfigError::Read {
          path: path.to_path_buf(),
          source,
        });
      }
    };

    if content.trim().is_empty() {
      return Ok(Self::default());
    }

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  fn apply_env(&mut self) {
    let env = PartialCredentials::from_env();
    self.broker = env.broker.or(self.broker.take());
    self.username = env.username.or(self.username.take());
    self.password = env.password.or(self.password.take());
    if let Some(cf) = std::env::var(ENV_CF_BINARY).ok().filter(|v| !v.is_empty()) {
      self.cf_binary = Some(cf);
    }
  }

  /// Credentials known from the profile and environment.
  pub fn credentials(&self) -> PartialCredentials {
    PartialCredentials {
      broker: self.broker.clone(),
      username: self.username.clone(),
      password: self.password.clone(),
    }
  }

  pub fn cf_binary(&self) -> &str {
    self.cf_binary.as_deref().unwrap_or(DEFAULT_CF_BINARY)
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.manifest.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST))
  }

  /// Length of one backoff unit for the readiness poller.
  pub fn poll_unit(&self) -> Duration {
    self.poll_unit_ms.map(Duration::from_millis).unwrap_or(Duration::from_secs(1))
  }
}
