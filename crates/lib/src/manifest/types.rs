//! Manifest document types.
//!
//! A manifest is a loosely-structured YAML document. It is held here as an
//! explicit tree of [`Node`]s so that shape checks become typed accessors
//! returning [`ShapeError`] instead of runtime assertions.
//!
//! # Structure
//!
//! ```yaml
//! services:            # optional, plain names or inline definitions
//!   - existing-db
//!   - name: cache
//!     location: aws
//!     services: [...]
//! applications:        # optional
//!   - name: web
//!     brooklyn: [...]  # legacy inline blueprints
//!     services: [...]
//! ```
//!
//! Mapping order is preserved so a rewritten manifest diffs cleanly against
//! the original.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_yaml::Value;
use thiserror::Error;

/// Key of the top-level and per-application services arrays.
pub const SERVICES_KEY: &str = "services";

/// Key of the applications array.
pub const APPLICATIONS_KEY: &str = "applications";

/// Key of the legacy inline-blueprint array inside an application.
pub const BROOKLYN_KEY: &str = "brooklyn";

/// A node had a different shape than the position requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} for {context}, found {found}")]
pub struct ShapeError {
  pub context: String,
  pub expected: &'static str,
  pub found: &'static str,
}

/// A scalar leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
  Null,
  Bool(bool),
  Number(serde_yaml::Number),
  String(String),
}

impl fmt::Display for Scalar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Scalar::Null => write!(f, "null"),
      Scalar::Bool(b) => write!(f, "{}", b),
      Scalar::Number(n) => write!(f, "{}", n),
      Scalar::String(s) => write!(f, "{}", s),
    }
  }
}

/// One node of the manifest tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
  Scalar(Scalar),
  Sequence(Vec<Node>),
  Mapping(Mapping),
}

impl Node {
  /// Human-readable name of the node's shape, used in error messages.
  pub fn kind(&self) -> &'static str {
    match self {
      Node::Scalar(Scalar::String(_)) => "string",
      Node::Scalar(Scalar::Null) => "null",
      Node::Scalar(Scalar::Bool(_)) => "boolean",
      Node::Scalar(Scalar::Number(_)) => "number",
      Node::Sequence(_) => "sequence",
      Node::Mapping(_) => "mapping",
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Node::Scalar(Scalar::String(s)) => Some(s),
      _ => None,
    }
  }

  pub fn as_mapping(&self) -> Option<&Mapping> {
    match self {
      Node::Mapping(m) => Some(m),
      _ => None,
    }
  }

  pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
    match self {
      Node::Mapping(m) => Some(m),
      _ => None,
    }
  }

  pub fn as_sequence(&self) -> Option<&Vec<Node>> {
    match self {
      Node::Sequence(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Node>> {
    match self {
      Node::Sequence(s) => Some(s),
      _ => None,
    }
  }

  /// Borrow as a string or fail with a [`ShapeError`] naming `context`.
  pub fn expect_str(&self, context: &str) -> Result<&str, ShapeError> {
    let found = self.kind();
    self.as_str().ok_or_else(|| shape_error(context, "string", found))
  }

  /// Borrow as a mapping or fail with a [`ShapeError`] naming `context`.
  pub fn expect_mapping(&self, context: &str) -> Result<&Mapping, ShapeError> {
    let found = self.kind();
    self.as_mapping().ok_or_else(|| shape_error(context, "mapping", found))
  }

  /// Mutably borrow as a mapping or fail with a [`ShapeError`] naming `context`.
  pub fn expect_mapping_mut(&mut self, context: &str) -> Result<&mut Mapping, ShapeError> {
    let found = self.kind();
    self.as_mapping_mut().ok_or_else(|| shape_error(context, "mapping", found))
  }

  /// Borrow as a sequence or fail with a [`ShapeError`] naming `context`.
  pub fn expect_sequence(&self, context: &str) -> Result<&Vec<Node>, ShapeError> {
    let found = self.kind();
    self.as_sequence().ok_or_else(|| shape_error(context, "sequence", found))
  }

  /// Mutably borrow as a sequence or fail with a [`ShapeError`] naming `context`.
  pub fn expect_sequence_mut(&mut self, context: &str) -> Result<&mut Vec<Node>, ShapeError> {
    let found = self.kind();
    self.as_sequence_mut().ok_or_else(|| shape_error(context, "sequence", found))
  }
}

fn shape_error(context: &str, expected: &'static str, found: &'static str) -> ShapeError {
  ShapeError {
    context: context.to_string(),
    expected,
    found,
  }
}

impl From<&str> for Node {
  fn from(s: &str) -> Self {
    Node::Scalar(Scalar::String(s.to_string()))
  }
}

impl From<String> for Node {
  fn from(s: String) -> Self {
    Node::Scalar(Scalar::String(s))
  }
}

impl From<Vec<Node>> for Node {
  fn from(items: Vec<Node>) -> Self {
    Node::Sequence(items)
  }
}

impl From<Mapping> for Node {
  fn from(mapping: Mapping) -> Self {
    Node::Mapping(mapping)
  }
}

/// An insertion-ordered mapping with string keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
  entries: Vec<(String, Node)>,
}

impl Mapping {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn get(&self, key: &str) -> Option<&Node> {
    self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
  }

  pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
    self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.get(key).is_some()
  }

  /// Insert or replace `key`. A replaced entry keeps its position.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
    let key = key.into();
    let value = value.into();
    match self.entries.iter_mut().find(|(k, _)| *k == key) {
      Some((_, slot)) => Some(std::mem::replace(slot, value)),
      None => {
        self.entries.push((key, value));
        None
      }
    }
  }

  /// Remove `key`, keeping the order of the remaining entries.
  pub fn remove(&mut self, key: &str) -> Option<Node> {
    let pos = self.entries.iter().position(|(k, _)| k == key)?;
    Some(self.entries.remove(pos).1)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(k, _)| k.as_str())
  }

  /// The `name` entry as a string, if present.
  pub fn name(&self) -> Option<&str> {
    self.get("name").and_then(Node::as_str)
  }
}

impl FromIterator<(String, Node)> for Mapping {
  fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
    let mut mapping = Mapping::new();
    for (k, v) in iter {
      mapping.insert(k, v);
    }
    mapping
  }
}

/// Conversion failure from a raw YAML value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedKey {
  #[error("unsupported mapping key of type {0}")]
  Kind(&'static str),

  /// Two distinct YAML keys that read the same once stringified, like `1` and `"1"`.
  #[error("duplicate mapping key `{0}`")]
  Duplicate(String),
}

impl TryFrom<Value> for Node {
  type Error = UnsupportedKey;

  fn try_from(value: Value) -> Result<Self, Self::Error> {
    Ok(match value {
      Value::Null => Node::Scalar(Scalar::Null),
      Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
      Value::Number(n) => Node::Scalar(Scalar::Number(n)),
      Value::String(s) => Node::Scalar(Scalar::String(s)),
      Value::Sequence(items) => Node::Sequence(items.into_iter().map(Node::try_from).collect::<Result<_, _>>()?),
      Value::Mapping(map) => {
        let mut mapping = Mapping::new();
        for (k, v) in map {
          let key = match k {
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Null => "null".to_string(),
            Value::Sequence(_) => return Err(UnsupportedKey::Kind("sequence")),
            Value::Mapping(_) => return Err(UnsupportedKey::Kind("mapping")),
            Value::Tagged(_) => return Err(UnsupportedKey::Kind("tagged value")),
          };
          if mapping.contains_key(&key) {
            return Err(UnsupportedKey::Duplicate(key));
          }
          mapping.insert(key, Node::try_from(v)?);
        }
        Node::Mapping(mapping)
      }
      // Tags carry no meaning for service resolution; keep the inner value.
      Value::Tagged(tagged) => Node::try_from(tagged.value)?,
    })
  }
}

impl Serialize for Node {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Node::Scalar(Scalar::Null) => serializer.serialize_unit(),
      Node::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
      Node::Scalar(Scalar::Number(n)) => n.serialize(serializer),
      Node::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
      Node::Sequence(items) => serializer.collect_seq(items),
      Node::Mapping(mapping) => mapping.serialize(serializer),
    }
  }
}

impl Serialize for Mapping {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (k, v) in &self.entries {
      map.serialize_entry(k, v)?;
    }
    map.end()
  }
}

/// The root of a manifest: always a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
  root: Mapping,
}

impl ManifestDocument {
  pub fn new(root: Mapping) -> Self {
    Self { root }
  }

  pub fn root(&self) -> &Mapping {
    &self.root
  }

  pub fn root_mut(&mut self) -> &mut Mapping {
    &mut self.root
  }

  /// The top-level `services` array, if present.
  pub fn services(&self) -> Result<Option<&Vec<Node>>, ShapeError> {
    self.root.get(SERVICES_KEY).map(|n| n.expect_sequence(SERVICES_KEY)).transpose()
  }

  pub fn services_mut(&mut self) -> Result<Option<&mut Vec<Node>>, ShapeError> {
    self
      .root
      .get_mut(SERVICES_KEY)
      .map(|n| n.expect_sequence_mut(SERVICES_KEY))
      .transpose()
  }

  /// The `applications` array, if present.
  pub fn applications(&self) -> Result<Option<&Vec<Node>>, ShapeError> {
    self
      .root
      .get(APPLICATIONS_KEY)
      .map(|n| n.expect_sequence(APPLICATIONS_KEY))
      .transpose()
  }

  pub fn applications_mut(&mut self) -> Result<Option<&mut Vec<Node>>, ShapeError> {
    self
      .root
      .get_mut(APPLICATIONS_KEY)
      .map(|n| n.expect_sequence_mut(APPLICATIONS_KEY))
      .transpose()
  }

  /// Whether any section still holds something other than plain name references.
  ///
  /// Sections are shape-checked on the way, so a malformed manifest fails here
  /// even when it has nothing to provision. A manifest for which this is
  /// `Ok(false)` can be deployed as-is without touching the broker.
  pub fn has_unresolved_entries(&self) -> Result<bool, ShapeError> {
    let unresolved = |services: Option<&Node>, context: &str| -> Result<bool, ShapeError> {
      Ok(match services {
        Some(node) => node.expect_sequence(context)?.iter().any(|n| n.as_str().is_none()),
        None => false,
      })
    };

    let mut found = unresolved(self.root.get(SERVICES_KEY), SERVICES_KEY)?;
    for app in self.applications()?.into_iter().flatten() {
      let app = app.expect_mapping("application")?;
      found |= app.contains_key(BROOKLYN_KEY);
      found |= unresolved(app.get(SERVICES_KEY), "application services")?;
    }
    Ok(found)
  }
}
