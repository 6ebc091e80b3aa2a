use anyhow::{Context, Result};

use brooklyn_lib::gateway::{Broker, Management};

use super::Session;
use crate::BrokerArgs;

/// Probe `service` once and print whether it is running.
pub fn cmd_ready(broker: BrokerArgs, service: &str) -> Result<()> {
  let session = Session::new()?;
  let client = session.broker(broker)?;

  let ready = session
    .runtime
    .block_on(async {
      let guid = session.cf.service_guid(service).await?;
      client.is_running(&guid).await
    })
    .with_context(|| format!("Failed to check {}", service))?;

  println!("Ready: {}", ready);
  Ok(())
}
