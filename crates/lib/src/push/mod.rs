//! The push flow: resolve inline services, wait for them, then deploy.
//!
//! - Loads the manifest
//! - Registers inline blueprints as catalog items (once per name)
//! - Creates the service instances
//! - Rewrites every resolved entry to its plain service name
//! - Waits until every created service reports ready
//! - Hands a working copy of the rewritten manifest to `cf push`
//!
//! Any failure aborts the push. Catalog items and services created before the
//! failure are left in place.

mod deploy;
mod types;

use std::collections::HashSet;

use tracing::{debug, info};

use crate::catalog::BlueprintDescriptor;
use crate::classify::{InlineDefinition, ServiceEntry, classify};
use crate::credentials::{BrokerCredentials, CredentialsProvider};
use crate::gateway::{Broker, BrokerClient, Management};
use crate::manifest::{BROOKLYN_KEY, ManifestDocument, ManifestStore, Mapping, Node, SERVICES_KEY};
use crate::ready::ReadinessPoller;

pub use deploy::deploy;
pub use types::*;

const LOCATION_KEY: &str = "location";

/// Resolves the service sections of one manifest.
pub struct Orchestrator<'a, M, B> {
  management: &'a M,
  broker: &'a B,
  credentials: &'a BrokerCredentials,
  /// Catalog items known to exist, checked or created during this run.
  registered: HashSet<String>,
  created: CreatedServices,
}

impl<'a, M: Management, B: Broker> Orchestrator<'a, M, B> {
  pub fn new(management: &'a M, broker: &'a B, credentials: &'a BrokerCredentials) -> Self {
    Self {
      management,
      broker,
      credentials,
      registered: HashSet::new(),
      created: CreatedServices::new(),
    }
  }

  /// Provision every inline and catalog-backed entry in `document`, replacing
  /// each with its service name. Returns the services created, in order.
  pub async fn resolve(mut self, document: &mut ManifestDocument) -> Result<CreatedServices, PushError> {
    if let Some(services) = document.services_mut()? {
      self.resolve_sequence(services, None).await?;
    }

    if let Some(applications) = document.applications_mut()? {
      for app in applications.iter_mut() {
        let app = app.expect_mapping_mut("application")?;
        self.resolve_application(app).await?;
      }
    }

    Ok(self.created)
  }

  async fn resolve_application(&mut self, app: &mut Mapping) -> Result<(), PushError> {
    if let Some(brooklyn) = app.remove(BROOKLYN_KEY) {
      let Node::Sequence(entries) = brooklyn else {
        return Err(PushError::Classification(format!(
          "expected sequence for {}, found {}",
          BROOKLYN_KEY,
          brooklyn.kind()
        )));
      };
      let default_location = app.get(LOCATION_KEY).cloned();

      let mut merged = Vec::with_capacity(entries.len());
      for entry in &entries {
        merged.push(Node::from(self.resolve_entry(entry, default_location.as_ref()).await?));
      }
      if let Some(existing) = app.get(SERVICES_KEY) {
        merged.extend(existing.expect_sequence("application services")?.iter().cloned());
      }
      debug!(app = app.name().unwrap_or("<unnamed>"), services = merged.len(), "merged brooklyn section");
      app.insert(SERVICES_KEY, merged);
    }

    if let Some(services) = app.get_mut(SERVICES_KEY) {
      let services = services.expect_sequence_mut("application services")?;
      self.resolve_sequence(services, None).await?;
    }

    Ok(())
  }

  /// Resolve mapping entries in place; plain names are left alone.
  async fn resolve_sequence(&mut self, items: &mut [Node], default_location: Option<&Node>) -> Result<(), PushError> {
    for item in items.iter_mut() {
      if item.as_str().is_some() {
        continue;
      }
      let name = self.resolve_entry(item, default_location).await?;
      *item = Node::from(name);
    }
    Ok(())
  }

  /// Classify and provision one entry, returning its service name.
  async fn resolve_entry(&mut self, entry: &Node, default_location: Option<&Node>) -> Result<String, PushError> {
    let entry = classify(entry, default_location)?;
    match &entry {
      ServiceEntry::NamedReference(_) => {}
      ServiceEntry::CatalogBacked { name, service, location } => {
        self.create_service(service, location.plan_name(), name).await?;
      }
      ServiceEntry::Inline(def) => {
        self.ensure_catalog_item(def).await?;
        self.create_service(&def.name, def.location.plan_name(), &def.name).await?;
      }
    }
    Ok(entry.name().to_string())
  }

  async fn create_service(&mut self, offering: &str, plan: &str, instance: &str) -> Result<(), PushError> {
    info!(service = %instance, offering = %offering, plan = %plan, "creating service");
    self.management.create_service(offering, plan, instance).await?;
    self.created.insert(instance);
    Ok(())
  }

  /// Register the blueprint as a catalog item unless one with its name exists.
  ///
  /// Access is enabled only after the broker is updated, since the broker must
  /// know the new item first.
  async fn ensure_catalog_item(&mut self, def: &InlineDefinition) -> Result<(), PushError> {
    if self.registered.contains(&def.name) {
      debug!(name = %def.name, "catalog item already handled in this run");
      return Ok(());
    }

    if self.management.catalog_item_exists(&def.name).await? {
      info!(name = %def.name, "catalog item exists, skipping registration");
    } else {
      let descriptor = BlueprintDescriptor::from_definition(def);
      let document = descriptor.to_yaml().map_err(|source| PushError::CatalogRender {
        name: def.name.clone(),
        source,
      })?;

      info!(name = %def.name, "adding catalog item");
      let body = self.broker.add_catalog(document).await?;
      debug!(name = %def.name, response = %body, "catalog item added");

      self
        .management
        .update_service_broker(self.credentials, self.broker.base_url())
        .await?;
      self.management.enable_service_access(&def.name).await?;
    }

    self.registered.insert(def.name.clone());
    Ok(())
  }
}

/// Resolve `document` and wait for everything it created to become ready.
pub async fn prepare<M: Management, B: Broker>(
  management: &M,
  broker: &B,
  credentials: &BrokerCredentials,
  document: &mut ManifestDocument,
  options: &PushOptions,
) -> Result<PushOutcome, PushError> {
  let created = Orchestrator::new(management, broker, credentials).resolve(document).await?;
  info!(count = created.len(), "services provisioned");

  let readiness = ReadinessPoller::new(management, broker, options.poll_unit)
    .await_ready(created.as_slice())
    .await?;

  Ok(PushOutcome { created, readiness })
}

/// Run the whole push against the manifest in `store`.
///
/// The manifest is shape-checked before anything else. Credentials are
/// resolved only if it has something to provision.
pub async fn push<M: Management, P: CredentialsProvider>(
  management: &M,
  credentials: &P,
  store: &ManifestStore,
  options: &PushOptions,
) -> Result<PushOutcome, PushError> {
  let mut document = store.load()?;

  let outcome = if document.has_unresolved_entries()? {
    let credentials = credentials.credentials()?;
    let broker = BrokerClient::connect(management, credentials.clone()).await?;
    prepare(management, &broker, &credentials, &mut document, options).await?
  } else {
    info!(manifest = ?store.path(), "no inline services to provision");
    PushOutcome::default()
  };

  deploy(management, store, &document, &options.push_args).await?;
  Ok(outcome)
}
