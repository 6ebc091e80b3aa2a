use std::time::Duration;

use thiserror::Error;

use crate::classify::ClassifyError;
use crate::credentials::CredentialsError;
use crate::gateway::GatewayError;
use crate::manifest::{ManifestError, ShapeError};
use crate::ready::{ReadinessReport, ReadyError};

/// Errors that abort a push. Nothing created before the failure is rolled back.
#[derive(Debug, Error)]
pub enum PushError {
  #[error("missing field `{field}` in {entry}")]
  MissingField { field: &'static str, entry: String },

  #[error("invalid location for service {name}: {detail}")]
  InvalidLocationShape { name: String, detail: String },

  #[error("invalid manifest: {0}")]
  Classification(String),

  #[error("remote call failed: {0}")]
  RemoteCallFailed(#[from] GatewayError),

  #[error(transparent)]
  Persistence(#[from] ManifestError),

  #[error(transparent)]
  Credentials(#[from] CredentialsError),

  #[error(transparent)]
  Interrupted(#[from] ReadyError),

  #[error("failed to render catalog item {name}: {source}")]
  CatalogRender {
    name: String,
    #[source]
    source: serde_yaml::Error,
  },
}

impl From<ClassifyError> for PushError {
  fn from(err: ClassifyError) -> Self {
    match err {
      ClassifyError::MissingField { field, entry } => PushError::MissingField { field, entry },
      ClassifyError::InvalidLocationShape { name, detail } => PushError::InvalidLocationShape { name, detail },
      ClassifyError::Unrecognized { .. } | ClassifyError::Shape(_) => PushError::Classification(err.to_string()),
    }
  }
}

impl From<ShapeError> for PushError {
  fn from(err: ShapeError) -> Self {
    PushError::Classification(err.to_string())
  }
}

/// Names of services provisioned during one run, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedServices(Vec<String>);

impl CreatedServices {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record `name`. Returns `false` if it was already recorded.
  pub fn insert(&mut self, name: impl Into<String>) -> bool {
    let name = name.into();
    if self.contains(&name) {
      return false;
    }
    self.0.push(name);
    true
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.iter().any(|n| n == name)
  }

  pub fn as_slice(&self) -> &[String] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }
}

/// Options for one push.
#[derive(Debug, Clone)]
pub struct PushOptions {
  /// Arguments forwarded to the deploy command, without `-f`.
  pub push_args: Vec<String>,
  /// Length of one readiness backoff unit.
  pub poll_unit: Duration,
}

impl Default for PushOptions {
  fn default() -> Self {
    Self {
      push_args: Vec::new(),
      poll_unit: Duration::from_secs(1),
    }
  }
}

/// What a push did before handing off to deploy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushOutcome {
  pub created: CreatedServices,
  pub readiness: ReadinessReport,
}
