//! CLI output formatting utilities.
//!
//! Colored status lines and the effector and sensor tree printers.

use std::time::Duration;

use owo_colors::{OwoColorize, Stream};

use brooklyn_lib::inspect::{EntityEffectors, EntitySensors, SensorNode, display_value};

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

const INDENT: &str = "  ";

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

/// Service name underlined with dashes.
pub fn print_heading(title: &str) {
  println!("{}", title.if_supports_color(Stream::Stdout, |s| s.green()));
  println!(
    "{}",
    "-".repeat(title.chars().count())
      .if_supports_color(Stream::Stdout, |s| s.green())
  );
}

pub fn print_effector_tree(entities: &[EntityEffectors]) {
  for entity in entities {
    print_effector_entity(entity, 0);
  }
}

fn print_effector_entity(entity: &EntityEffectors, depth: usize) {
  let label = if depth == 0 {
    format!("Application: {}", entity.name)
  } else {
    entity.name.clone()
  };
  println!(
    "{}{}",
    INDENT.repeat(depth),
    label.if_supports_color(Stream::Stdout, |s| s.green())
  );

  let pad = INDENT.repeat(depth + 1);
  for effector in &entity.effectors {
    println!(
      "{}{:<30} {}",
      pad,
      effector.name.if_supports_color(Stream::Stdout, |s| s.red()),
      effector.description
    );
    if !effector.parameters.is_empty() {
      println!("{}{}parameters:", pad, INDENT);
      for param in &effector.parameters {
        println!("{}{}{:<17} {}", pad, INDENT, param.name, param.description);
      }
    }
  }

  for child in &entity.children {
    print_effector_entity(child, depth + 1);
  }
}

pub fn print_sensor_tree(entities: &[EntitySensors]) {
  for entity in entities {
    print_sensor_entity(entity, 0);
  }
}

fn print_sensor_entity(entity: &EntitySensors, depth: usize) {
  let label = if depth == 0 {
    format!("Entity: {}", entity.name)
  } else {
    entity.name.clone()
  };
  println!(
    "{}{}",
    INDENT.repeat(depth),
    label.if_supports_color(Stream::Stdout, |s| s.green())
  );
  print_sensor_nodes(&entity.sensors, depth + 1);
  for child in &entity.children {
    print_sensor_entity(child, depth + 1);
  }
}

fn print_sensor_nodes(nodes: &[SensorNode], depth: usize) {
  let pad = INDENT.repeat(depth);
  for node in nodes {
    match node {
      SensorNode::Value { name, value } => println!("{}{}: {}", pad, name, display_value(value)),
      SensorNode::Group { name, entries } => {
        println!("{}{}", pad, name);
        print_sensor_nodes(entries, depth + 1);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_format_duration() {
    assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
    assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
  }
}
