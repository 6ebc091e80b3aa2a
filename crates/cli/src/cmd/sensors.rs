use anyhow::{Context, Result};

use brooklyn_lib::gateway::{Broker, Management};
use brooklyn_lib::inspect::parse_sensors;

use super::Session;
use crate::BrokerArgs;
use crate::output::{print_heading, print_sensor_tree};

pub fn cmd_sensors(broker: BrokerArgs, service: &str) -> Result<()> {
  let session = Session::new()?;
  let client = session.broker(broker)?;

  let tree = session.runtime.block_on(async {
    let guid = session.cf.service_guid(service).await?;
    client.sensors(&guid).await
  })?;
  let entities = parse_sensors(&tree).context("Failed to read sensor listing")?;

  print_heading(service);
  print_sensor_tree(&entities);
  Ok(())
}
