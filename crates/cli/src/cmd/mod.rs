mod catalog;
mod effectors;
mod push;
mod ready;
mod sensors;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use brooklyn_lib::config::Config;
use brooklyn_lib::credentials::CredentialsProvider;
use brooklyn_lib::gateway::{BrokerClient, CfCli};

use crate::BrokerArgs;
use crate::prompts::PromptCredentials;

pub use catalog::{cmd_add_catalog, cmd_delete_catalog};
pub use effectors::{cmd_effectors, cmd_invoke};
pub use push::cmd_push;
pub use ready::cmd_ready;
pub use sensors::cmd_sensors;

/// Shared setup for commands that talk to the platform.
struct Session {
  config: Config,
  cf: CfCli,
  runtime: Runtime,
}

impl Session {
  fn new() -> Result<Self> {
    let config = Config::load().context("Failed to load configuration")?;
    let cf = CfCli::new(config.cf_binary());
    let runtime = Runtime::new().context("Failed to create async runtime")?;
    Ok(Self { config, cf, runtime })
  }

  fn credentials(&self, args: BrokerArgs) -> PromptCredentials {
    PromptCredentials::new(args, self.config.credentials())
  }

  /// Resolve credentials and connect to the broker they name.
  fn broker(&self, args: BrokerArgs) -> Result<BrokerClient> {
    let credentials = self.credentials(args).credentials()?;
    self
      .runtime
      .block_on(BrokerClient::connect(&self.cf, credentials))
      .context("Failed to resolve broker URL")
  }
}
