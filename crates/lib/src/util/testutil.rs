//! Test doubles for the management and broker gateways.
//!
//! [`FakeCloud`] implements both gateways and records every call in order, so
//! tests can assert on the exact provisioning sequence.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use crate::credentials::BrokerCredentials;
use crate::gateway::{Broker, GatewayError, Management};
use crate::manifest::Node;

pub const BROKER_URL: &str = "https://broker.example.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  CatalogExists(String),
  AddCatalog(String),
  UpdateServiceBroker { broker: String, url: String },
  EnableServiceAccess(String),
  CreateService { offering: String, plan: String, instance: String },
  ServiceGuid(String),
  IsRunning(String),
  Push { args: Vec<String>, manifest: String },
}

#[derive(Default)]
struct State {
  calls: Vec<Call>,
  catalog: HashSet<String>,
  readiness: HashMap<String, VecDeque<bool>>,
  fail_create_service: Option<String>,
}

/// In-memory stand-in for the platform and the broker.
#[derive(Default)]
pub struct FakeCloud {
  state: Mutex<State>,
}

impl FakeCloud {
  pub fn new() -> Self {
    Self::default()
  }

  /// Pretend `name` is already in the catalog.
  pub fn with_catalog_item(self, name: &str) -> Self {
    self.state.lock().unwrap().catalog.insert(name.to_string());
    self
  }

  /// Script readiness answers for `name`; the last answer repeats.
  pub fn with_readiness(self, name: &str, answers: &[bool]) -> Self {
    self
      .state
      .lock()
      .unwrap()
      .readiness
      .insert(name.to_string(), answers.iter().copied().collect());
    self
  }

  /// Make `create-service` fail for `instance`.
  pub fn failing_create_service(self, instance: &str) -> Self {
    self.state.lock().unwrap().fail_create_service = Some(instance.to_string());
    self
  }

  pub fn calls(&self) -> Vec<Call> {
    self.state.lock().unwrap().calls.clone()
  }

  /// Calls that change remote state, ignoring lookups and probes.
  pub fn mutating_calls(&self) -> Vec<Call> {
    self
      .calls()
      .into_iter()
      .filter(|c| {
        !matches!(
          c,
          Call::CatalogExists(_) | Call::ServiceGuid(_) | Call::IsRunning(_)
        )
      })
      .collect()
  }

  pub fn add_catalog_count(&self) -> usize {
    self.calls().iter().filter(|c| matches!(c, Call::AddCatalog(_))).count()
  }

  fn record(&self, call: Call) {
    self.state.lock().unwrap().calls.push(call);
  }
}

impl Management for FakeCloud {
  async fn service_guid(&self, name: &str) -> Result<String, GatewayError> {
    self.record(Call::ServiceGuid(name.to_string()));
    Ok(format!("guid-{}", name))
  }

  async fn create_service(&self, offering: &str, plan: &str, instance: &str) -> Result<(), GatewayError> {
    self.record(Call::CreateService {
      offering: offering.to_string(),
      plan: plan.to_string(),
      instance: instance.to_string(),
    });
    if self.state.lock().unwrap().fail_create_service.as_deref() == Some(instance) {
      return Err(GatewayError::CommandFailed {
        command: format!("cf create-service {} {} {}", offering, plan, instance),
        code: Some(1),
        message: "quota exceeded".to_string(),
      });
    }
    Ok(())
  }

  async fn update_service_broker(&self, credentials: &BrokerCredentials, url: &str) -> Result<(), GatewayError> {
    self.record(Call::UpdateServiceBroker {
      broker: credentials.broker.clone(),
      url: url.to_string(),
    });
    Ok(())
  }

  async fn enable_service_access(&self, offering: &str) -> Result<(), GatewayError> {
    self.record(Call::EnableServiceAccess(offering.to_string()));
    Ok(())
  }

  async fn catalog_item_exists(&self, name: &str) -> Result<bool, GatewayError> {
    self.record(Call::CatalogExists(name.to_string()));
    Ok(self.state.lock().unwrap().catalog.contains(name))
  }

  async fn service_broker_url(&self, _broker: &str) -> Result<String, GatewayError> {
    Ok(BROKER_URL.to_string())
  }

  async fn push(&self, args: &[String], manifest: &Path) -> Result<(), GatewayError> {
    let content = std::fs::read_to_string(manifest).map_err(|source| GatewayError::Spawn {
      command: "cf push".to_string(),
      source,
    })?;
    self.record(Call::Push {
      args: args.to_vec(),
      manifest: content,
    });
    Ok(())
  }
}

impl Broker for FakeCloud {
  fn base_url(&self) -> &str {
    BROKER_URL
  }

  async fn add_catalog(&self, document: String) -> Result<String, GatewayError> {
    let name = serde_yaml::from_str::<serde_yaml::Value>(&document)
      .ok()
      .and_then(|v| v.get("name").and_then(|n| n.as_str()).map(str::to_string))
      .unwrap_or_default();
    let mut state = self.state.lock().unwrap();
    state.catalog.insert(name);
    state.calls.push(Call::AddCatalog(document));
    Ok(String::new())
  }

  async fn delete_catalog(&self, name: &str, _version: &str) -> Result<String, GatewayError> {
    self.state.lock().unwrap().catalog.remove(name);
    Ok(String::new())
  }

  async fn effectors(&self, _guid: &str) -> Result<serde_json::Value, GatewayError> {
    Ok(serde_json::json!({}))
  }

  async fn invoke(
    &self,
    _guid: &str,
    _entity_type: &str,
    _effector: &str,
    _params: &BTreeMap<String, String>,
  ) -> Result<String, GatewayError> {
    Ok(String::new())
  }

  async fn sensors(&self, _guid: &str) -> Result<serde_json::Value, GatewayError> {
    Ok(serde_json::json!({}))
  }

  async fn is_running(&self, guid: &str) -> Result<bool, GatewayError> {
    self.record(Call::IsRunning(guid.to_string()));
    let name = guid.trim_start_matches("guid-");
    let mut state = self.state.lock().unwrap();
    let answer = match state.readiness.get_mut(name) {
      Some(answers) if answers.len() > 1 => answers.pop_front().unwrap_or(true),
      Some(answers) => answers.front().copied().unwrap_or(true),
      None => true,
    };
    Ok(answer)
  }
}

/// Parse YAML into a manifest node.
pub fn yaml_node(yaml: &str) -> Node {
  Node::try_from(serde_yaml::from_str::<serde_yaml::Value>(yaml).unwrap()).unwrap()
}

pub fn test_credentials() -> BrokerCredentials {
  BrokerCredentials::new("brooklyn", "admin", "secret")
}
