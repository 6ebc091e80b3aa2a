//! Catalog items built from inline blueprints.
//!
//! A blueprint's nested services are wrapped in a single BasicApplication and
//! registered under the blueprint's name. The nested content is opaque here;
//! only the broker interprets it.
//!
//! # Plan handling
//!
//! A plan map is committed into the catalog item as a top-level `location`, so
//! every plan in it is registered. A single plan name is not embedded: it is
//! passed at service-creation time and the item stays plan-agnostic.

use crate::classify::{InlineDefinition, LocationSpec};
use crate::consts::{BASIC_APPLICATION_TYPE, CATALOG_ITEM_DESCRIPTION, CATALOG_ITEM_VERSION};
use crate::manifest::{Mapping, Node};

/// A catalog item ready to be posted to the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintDescriptor {
  pub id: String,
  pub name: String,
  pub version: String,
  pub description: String,
  /// Children of the wrapping application, copied verbatim from the manifest.
  pub children: Vec<Node>,
  /// Plan map registered with the item, if the plan-map form was used.
  pub location: Option<Mapping>,
}

impl BlueprintDescriptor {
  /// Build the descriptor for blueprint `name`.
  pub fn build(name: &str, children: &[Node], location: &LocationSpec) -> Self {
    Self {
      id: name.to_string(),
      name: name.to_string(),
      version: CATALOG_ITEM_VERSION.to_string(),
      description: CATALOG_ITEM_DESCRIPTION.to_string(),
      children: children.to_vec(),
      location: match location {
        LocationSpec::PlanMap(plans) => Some(plans.clone()),
        LocationSpec::SinglePlan(_) => None,
      },
    }
  }

  pub fn from_definition(def: &InlineDefinition) -> Self {
    Self::build(&def.name, &def.services, &def.location)
  }

  /// The catalog document in the layout the broker expects.
  pub fn to_node(&self) -> Node {
    let mut entry = Mapping::new();
    entry.insert("id", self.id.as_str());
    entry.insert("version", self.version.as_str());
    entry.insert("iconUrl", "");
    entry.insert("description", self.description.as_str());

    let mut application = Mapping::new();
    application.insert("type", BASIC_APPLICATION_TYPE);
    application.insert("brooklyn.children", self.children.clone());

    let mut root = Mapping::new();
    root.insert("brooklyn.catalog", entry);
    root.insert("name", self.name.as_str());
    if let Some(location) = &self.location {
      root.insert("location", location.clone());
    }
    root.insert("services", vec![Node::from(application)]);
    Node::from(root)
  }

  pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&self.to_node())
  }
}
