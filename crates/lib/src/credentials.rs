//! Broker credentials and how they are resolved.
//!
//! Credentials are gathered from layered partial sources (command-line
//! arguments, environment, profile) and resolved exactly once per run through
//! a [`CredentialsProvider`].

use std::fmt;

use thiserror::Error;

use crate::consts::{ENV_BROKER, ENV_PASSWORD, ENV_USERNAME};

#[derive(Debug, Error)]
pub enum CredentialsError {
  #[error("missing broker credentials: {}", missing.join(", "))]
  Incomplete { missing: Vec<&'static str> },

  #[error("failed to read {field}: {source}")]
  Input {
    field: &'static str,
    #[source]
    source: std::io::Error,
  },
}

/// Credentials for one broker, fixed for the duration of a run.
#[derive(Clone, PartialEq, Eq)]
pub struct BrokerCredentials {
  pub broker: String,
  pub username: String,
  pub password: String,
}

impl BrokerCredentials {
  pub fn new(broker: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
    Self {
      broker: broker.into(),
      username: username.into(),
      password: password.into(),
    }
  }
}

impl fmt::Debug for BrokerCredentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BrokerCredentials")
      .field("broker", &self.broker)
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// Credentials where any field may still be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialCredentials {
  pub broker: Option<String>,
  pub username: Option<String>,
  pub password: Option<String>,
}

impl PartialCredentials {
  /// Read whatever the environment provides.
  pub fn from_env() -> Self {
    let var = |name: &str| std::env::var(name).ok().filter(|v: &String| !v.is_empty());
    Self {
      broker: var(ENV_BROKER),
      username: var(ENV_USERNAME),
      password: var(ENV_PASSWORD),
    }
  }

  /// Fill fields that are still unset from `fallback`.
  pub fn or(self, fallback: PartialCredentials) -> Self {
    Self {
      broker: self.broker.or(fallback.broker),
      username: self.username.or(fallback.username),
      password: self.password.or(fallback.password),
    }
  }

  /// Names of the fields that are still unset.
  pub fn missing(&self) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if self.broker.is_none() {
      missing.push("broker");
    }
    if self.username.is_none() {
      missing.push("username");
    }
    if self.password.is_none() {
      missing.push("password");
    }
    missing
  }

  pub fn into_complete(self) -> Result<BrokerCredentials, CredentialsError> {
    match (self.broker, self.username, self.password) {
      (Some(broker), Some(username), Some(password)) => Ok(BrokerCredentials {
        broker,
        username,
        password,
      }),
      (broker, username, password) => Err(CredentialsError::Incomplete {
        missing: PartialCredentials {
          broker,
          username,
          password,
        }
        .missing(),
      }),
    }
  }
}

impl From<BrokerCredentials> for PartialCredentials {
  fn from(creds: BrokerCredentials) -> Self {
    Self {
      broker: Some(creds.broker),
      username: Some(creds.username),
      password: Some(creds.password),
    }
  }
}

/// Source of broker credentials for a run.
pub trait CredentialsProvider {
  fn credentials(&self) -> Result<BrokerCredentials, CredentialsError>;
}

/// Credentials known up front; never prompts.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub PartialCredentials);

impl CredentialsProvider for StaticCredentials {
  fn credentials(&self) -> Result<BrokerCredentials, CredentialsError> {
    self.0.clone().into_complete()
  }
}
