//! External collaborators: the management CLI and the broker REST API.
//!
//! The push flow only talks to these traits. [`CfCli`] and [`BrokerClient`]
//! are the production implementations.

mod broker;
mod cf;

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::credentials::BrokerCredentials;

pub use broker::BrokerClient;
pub use cf::{CfCli, parse_broker_url, parse_marketplace_has_ok};

/// A call to the management CLI or the broker did not succeed.
#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("failed to run `{command}`: {source}")]
  Spawn {
    command: String,
    #[source]
    source: std::io::Error,
  },

  #[error("`{command}` exited with code {code:?}: {message}")]
  CommandFailed {
    command: String,
    code: Option<i32>,
    message: String,
  },

  #[error("request to {url} failed: {message}")]
  RequestFailed { url: String, message: String },

  #[error("invalid response from {url}: {message}")]
  InvalidResponse { url: String, message: String },

  #[error("service {0} not found")]
  UnknownService(String),

  #[error("service broker {0} not found")]
  UnknownBroker(String),
}

/// Management operations executed through the platform CLI.
#[allow(async_fn_in_trait)]
pub trait Management {
  /// Resolve a service instance name to its GUID.
  async fn service_guid(&self, name: &str) -> Result<String, GatewayError>;

  /// Create an instance of `offering` under `plan`.
  async fn create_service(&self, offering: &str, plan: &str, instance: &str) -> Result<(), GatewayError>;

  /// Re-register the broker so it picks up new catalog items.
  async fn update_service_broker(&self, credentials: &BrokerCredentials, url: &str) -> Result<(), GatewayError>;

  async fn enable_service_access(&self, offering: &str) -> Result<(), GatewayError>;

  /// Whether the marketplace already lists `name`.
  async fn catalog_item_exists(&self, name: &str) -> Result<bool, GatewayError>;

  /// URL the broker named `broker` is registered under.
  async fn service_broker_url(&self, broker: &str) -> Result<String, GatewayError>;

  /// Deploy with the given push arguments and manifest file.
  async fn push(&self, args: &[String], manifest: &Path) -> Result<(), GatewayError>;
}

/// The broker's REST surface.
#[allow(async_fn_in_trait)]
pub trait Broker {
  /// Base URL all requests are sent to.
  fn base_url(&self) -> &str;

  /// Register a catalog item from its YAML document.
  async fn add_catalog(&self, document: String) -> Result<String, GatewayError>;

  async fn delete_catalog(&self, name: &str, version: &str) -> Result<String, GatewayError>;

  async fn effectors(&self, guid: &str) -> Result<serde_json::Value, GatewayError>;

  async fn invoke(
    &self,
    guid: &str,
    entity_type: &str,
    effector: &str,
    params: &BTreeMap<String, String>,
  ) -> Result<String, GatewayError>;

  async fn sensors(&self, guid: &str) -> Result<serde_json::Value, GatewayError>;

  /// Single readiness probe for the instance with `guid`.
  async fn is_running(&self, guid: &str) -> Result<bool, GatewayError>;
}
