//! `effectors` and `invoke`: listing and calling effectors on a service.

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use brooklyn_lib::gateway::{Broker, Management};
use brooklyn_lib::inspect::{parse_effectors, parse_invoke_params, split_effector};

use super::Session;
use crate::BrokerArgs;
use crate::output::{print_effector_tree, print_heading, print_success};

pub fn cmd_effectors(broker: BrokerArgs, service: &str) -> Result<()> {
  let session = Session::new()?;
  let client = session.broker(broker)?;

  let tree = session.runtime.block_on(async {
    let guid = session.cf.service_guid(service).await?;
    client.effectors(&guid).await
  })?;
  let entities = parse_effectors(&tree).context("Failed to read effector listing")?;

  print_heading(service);
  print_effector_tree(&entities);
  Ok(())
}

pub fn cmd_invoke(broker: BrokerArgs, service: &str, effector: &str, params: &[String]) -> Result<()> {
  // Validate before any remote call.
  let (entity_type, effector_name) = split_effector(effector)?;
  let params = parse_invoke_params(params)?;

  let session = Session::new()?;
  let client = session.broker(broker)?;

  println!(
    "Invoking effector {}",
    effector.if_supports_color(Stream::Stdout, |s| s.cyan())
  );
  let body = session
    .runtime
    .block_on(async {
      let guid = session.cf.service_guid(service).await?;
      client.invoke(&guid, entity_type, effector_name, &params).await
    })
    .with_context(|| format!("Failed to invoke {} on {}", effector, service))?;

  if !body.trim().is_empty() {
    println!("{}", body.trim_end());
  }
  print_success("Effector invoked");
  Ok(())
}
