//! Effector and sensor views of a running service.
//!
//! The broker returns both as loosely typed JSON trees keyed by entity name,
//! with nested entities under a `children` key. These are parsed into typed
//! trees for display.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

const CHILDREN_KEY: &str = "children";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InspectError {
  #[error("invalid effector `{0}`: expected <entity-type>:<effector>")]
  InvalidEffector(String),

  #[error("invalid parameter format at `{0}`: expected --name value")]
  InvalidParameter(String),

  #[error("parameter --{0} has no value")]
  MissingParameterValue(String),

  #[error("unexpected {what} in broker response: expected an object at {path}")]
  UnexpectedShape { what: &'static str, path: String },
}

/// Split `type:effector` into its two halves.
pub fn split_effector(effector: &str) -> Result<(&str, &str), InspectError> {
  match effector.split_once(':') {
    Some((entity_type, name)) if !entity_type.is_empty() && !name.is_empty() => Ok((entity_type, name)),
    _ => Err(InspectError::InvalidEffector(effector.to_string())),
  }
}

/// Parse `--name value` pairs into an invocation parameter map.
pub fn parse_invoke_params(args: &[String]) -> Result<BTreeMap<String, String>, InspectError> {
  let mut params = BTreeMap::new();
  let mut iter = args.iter();
  while let Some(flag) = iter.next() {
    let key = flag
      .strip_prefix("--")
      .filter(|k| !k.is_empty())
      .ok_or_else(|| InspectError::InvalidParameter(flag.clone()))?;
    let value = iter
      .next()
      .ok_or_else(|| InspectError::MissingParameterValue(key.to_string()))?;
    params.insert(key.to_string(), value.clone());
  }
  Ok(params)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
  pub name: String,
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectorInfo {
  pub name: String,
  pub description: String,
  pub parameters: Vec<ParameterInfo>,
}

/// Effectors of one entity and of the entities below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityEffectors {
  pub name: String,
  pub effectors: Vec<EffectorInfo>,
  pub children: Vec<EntityEffectors>,
}

/// Parse the broker's effector listing. Top-level keys are applications.
pub fn parse_effectors(value: &Value) -> Result<Vec<EntityEffectors>, InspectError> {
  entities_from(expect_object(value, "effector tree", "$")?, "$", effector_entity)
}

fn effector_entity(name: &str, value: &Value, path: &str) -> Result<EntityEffectors, InspectError> {
  let body = expect_object(value, "entity", path)?;
  let mut effectors = Vec::new();
  for (key, effector) in body.iter().filter(|(k, _)| *k != CHILDREN_KEY) {
    let path = format!("{}.{}", path, key);
    let effector = expect_object(effector, "effector", &path)?;
    effectors.push(EffectorInfo {
      name: key.clone(),
      description: string_field(effector, "description"),
      parameters: effector
        .get("parameters")
        .and_then(Value::as_array)
        .map(|params| {
          params
            .iter()
            .filter_map(Value::as_object)
            .map(|p| ParameterInfo {
              name: string_field(p, "name"),
              description: string_field(p, "description"),
            })
            .collect()
        })
        .unwrap_or_default(),
    });
  }

  Ok(EntityEffectors {
    name: name.to_string(),
    effectors,
    children: children_of(body, path, effector_entity)?,
  })
}

/// A sensor reading, or a group of readings nested under one key.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorNode {
  Value { name: String, value: Value },
  Group { name: String, entries: Vec<SensorNode> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySensors {
  pub name: String,
  pub sensors: Vec<SensorNode>,
  pub children: Vec<EntitySensors>,
}

/// Parse the broker's sensor listing. Top-level keys are entities.
pub fn parse_sensors(value: &Value) -> Result<Vec<EntitySensors>, InspectError> {
  let root = expect_object(value, "sensor tree", "$")?;
  root
    .iter()
    .map(|(name, body)| sensor_entity(name, body, &format!("$.{}", name)))
    .collect()
}

fn sensor_entity(name: &str, value: &Value, path: &str) -> Result<EntitySensors, InspectError> {
  let body = expect_object(value, "entity", path)?;
  Ok(EntitySensors {
    name: name.to_string(),
    sensors: sensor_nodes(body),
    children: children_of(body, path, sensor_entity)?,
  })
}

fn sensor_nodes(body: &Map<String, Value>) -> Vec<SensorNode> {
  body
    .iter()
    .filter(|(k, _)| *k != CHILDREN_KEY)
    .map(|(name, value)| match value {
      Value::Object(nested) => SensorNode::Group {
        name: name.clone(),
        entries: sensor_nodes(nested),
      },
      other => SensorNode::Value {
        name: name.clone(),
        value: other.clone(),
      },
    })
    .collect()
}

/// Render a sensor value the way an operator expects to read it.
pub fn display_value(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => "null".to_string(),
    other => other.to_string(),
  }
}

fn entities_from<T>(
  map: &Map<String, Value>,
  path: &str,
  parse: fn(&str, &Value, &str) -> Result<T, InspectError>,
) -> Result<Vec<T>, InspectError> {
  let mut out = Vec::new();
  for (name, body) in map.iter().filter(|(k, _)| *k != CHILDREN_KEY) {
    out.push(parse(name, body, &format!("{}.{}", path, name))?);
  }
  out.extend(children_of(map, path, parse)?);
  Ok(out)
}

fn children_of<T>(
  body: &Map<String, Value>,
  path: &str,
  parse: fn(&str, &Value, &str) -> Result<T, InspectError>,
) -> Result<Vec<T>, InspectError> {
  match body.get(CHILDREN_KEY) {
    None | Some(Value::Null) => Ok(Vec::new()),
    Some(children) => {
      let path = format!("{}.{}", path, CHILDREN_KEY);
      let children = expect_object(children, "children", &path)?;
      children
        .iter()
        .map(|(name, child)| parse(name, child, &format!("{}.{}", path, name)))
        .collect()
    }
  }
}

fn expect_object<'a>(value: &'a Value, what: &'static str, path: &str) -> Result<&'a Map<String, Value>, InspectError> {
  value.as_object().ok_or_else(|| InspectError::UnexpectedShape {
    what,
    path: path.to_string(),
  })
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
  map.get(key).map(display_value).unwrap_or_default()
}
