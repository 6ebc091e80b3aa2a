//! Catalog item management: `add-catalog` and `delete-catalog`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use brooklyn_lib::gateway::Broker;

use super::Session;
use crate::BrokerArgs;
use crate::output::{print_info, print_success};

pub fn cmd_add_catalog(broker: BrokerArgs, file: &Path) -> Result<()> {
  let document = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;

  let session = Session::new()?;
  let client = session.broker(broker)?;

  print_info("Adding catalog item...");
  let body = session
    .runtime
    .block_on(client.add_catalog(document))
    .context("Failed to add catalog item")?;
  debug!(response = %body, "add-catalog response");

  print_success("Catalog item successfully added");
  Ok(())
}

pub fn cmd_delete_catalog(broker: BrokerArgs, name: &str, version: &str) -> Result<()> {
  let session = Session::new()?;
  let client = session.broker(broker)?;

  print_info(&format!("Deleting catalog item {} {}...", name, version));
  let body = session
    .runtime
    .block_on(client.delete_catalog(name, version))
    .context("Failed to delete catalog item")?;
  debug!(response = %body, "delete-catalog response");

  print_success("Catalog item deleted");
  Ok(())
}
