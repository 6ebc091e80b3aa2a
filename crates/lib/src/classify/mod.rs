//! Classification of service entries.
//!
//! Every element of a `services` (or legacy `brooklyn`) array is one of:
//! - a plain name referring to a service that already exists,
//! - a catalog-backed definition (`service` + `location`) instantiating an
//!   existing catalog item,
//! - an inline blueprint (`services` + `location`) that must first be
//!   registered as a catalog item.

use thiserror::Error;

use crate::manifest::{Mapping, Node, SERVICES_KEY, ShapeError};

const NAME_KEY: &str = "name";
const LOCATION_KEY: &str = "location";
const SERVICE_KEY: &str = "service";

/// Errors raised while classifying a service entry.
#[derive(Debug, Error)]
pub enum ClassifyError {
  #[error("missing field `{field}` in {entry}")]
  MissingField { field: &'static str, entry: String },

  #[error("invalid location for service {name}: {detail}")]
  InvalidLocationShape { name: String, detail: String },

  #[error("unrecognized service entry {name}: expected `service` or `services`")]
  Unrecognized { name: String },

  #[error("invalid service entry: {0}")]
  Shape(#[from] ShapeError),
}

/// Where a service is deployed.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSpec {
  /// A single named plan, supplied at service-creation time.
  SinglePlan(String),
  /// A single-entry map of plan name to plan parameters, registered with the
  /// catalog item.
  PlanMap(Mapping),
}

impl LocationSpec {
  /// Parse a `location` node belonging to the service `name`.
  pub fn from_node(node: &Node, name: &str) -> Result<Self, ClassifyError> {
    match node {
      Node::Mapping(plans) if plans.len() == 1 => Ok(LocationSpec::PlanMap(plans.clone())),
      Node::Mapping(plans) => Err(ClassifyError::InvalidLocationShape {
        name: name.to_string(),
        detail: format!("plan map must have exactly one entry, found {}", plans.len()),
      }),
      other => match other.as_str() {
        Some(plan) => Ok(LocationSpec::SinglePlan(plan.to_string())),
        None => Err(ClassifyError::InvalidLocationShape {
          name: name.to_string(),
          detail: format!("expected a plan name or a plan map, found {}", other.kind()),
        }),
      },
    }
  }

  /// The plan passed to `create-service`.
  pub fn plan_name(&self) -> &str {
    match self {
      LocationSpec::SinglePlan(plan) => plan,
      // Construction guarantees exactly one key.
      LocationSpec::PlanMap(plans) => plans.keys().next().unwrap_or_default(),
    }
  }
}

/// An inline blueprint awaiting registration.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineDefinition {
  pub name: String,
  pub location: LocationSpec,
  /// Nested definitions, passed verbatim to the catalog.
  pub services: Vec<Node>,
}

/// A classified service entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEntry {
  NamedReference(String),
  CatalogBacked {
    name: String,
    service: String,
    location: LocationSpec,
  },
  Inline(InlineDefinition),
}

impl ServiceEntry {
  /// The service instance name this entry resolves to.
  pub fn name(&self) -> &str {
    match self {
      ServiceEntry::NamedReference(name) => name,
      ServiceEntry::CatalogBacked { name, .. } => name,
      ServiceEntry::Inline(def) => &def.name,
    }
  }
}

/// Classify one element of a services array.
///
/// `default_location` is the owning application's `location`, used by entries
/// that do not carry their own.
pub fn classify(entry: &Node, default_location: Option<&Node>) -> Result<ServiceEntry, ClassifyError> {
  if let Some(name) = entry.as_str() {
    return Ok(ServiceEntry::NamedReference(name.to_string()));
  }

  let mapping = entry.expect_mapping("service entry")?;
  let name = match mapping.get(NAME_KEY) {
    Some(node) => node.expect_str("service name")?.to_string(),
    None => {
      return Err(ClassifyError::MissingField {
        field: NAME_KEY,
        entry: describe(mapping),
      });
    }
  };

  let location = || -> Result<LocationSpec, ClassifyError> {
    let node = mapping
      .get(LOCATION_KEY)
      .or(default_location)
      .ok_or_else(|| ClassifyError::MissingField {
        field: LOCATION_KEY,
        entry: format!("service {}", name),
      })?;
    LocationSpec::from_node(node, &name)
  };

  if let Some(service) = mapping.get(SERVICE_KEY) {
    let service = service.expect_str("service offering")?.to_string();
    return Ok(ServiceEntry::CatalogBacked {
      location: location()?,
      name,
      service,
    });
  }

  if let Some(services) = mapping.get(SERVICES_KEY) {
    let services = services.expect_sequence("blueprint services")?.clone();
    return Ok(ServiceEntry::Inline(InlineDefinition {
      location: location()?,
      name,
      services,
    }));
  }

  Err(ClassifyError::Unrecognized { name })
}

fn describe(mapping: &Mapping) -> String {
  let keys: Vec<_> = mapping.keys().collect();
  format!("service entry with keys [{}]", keys.join(", "))
}
