//! Management gateway backed by the `cf` command line.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use super::{GatewayError, Management};
use crate::credentials::BrokerCredentials;

/// Runs management operations through the `cf` binary.
#[derive(Debug, Clone)]
pub struct CfCli {
  binary: String,
}

impl CfCli {
  pub fn new(binary: impl Into<String>) -> Self {
    Self { binary: binary.into() }
  }

  /// Run a command and capture its stdout.
  ///
  /// `shown` is the argument list used in logs and errors, so secrets can be
  /// masked.
  async fn output(&self, args: &[&str], shown: &str) -> Result<String, GatewayError> {
    let command = format!("{} {}", self.binary, shown);
    debug!(command = %command, "running management command");

    let output = Command::new(&self.binary)
      .args(args)
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|source| GatewayError::Spawn {
        command: command.clone(),
        source,
      })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if !stdout.is_empty() {
        debug!(stdout = %stdout, "command stdout");
      }
      let detail = if stderr.trim().is_empty() { stdout.trim() } else { stderr.trim() };
      return Err(GatewayError::CommandFailed {
        command,
        code: output.status.code(),
        message: detail.to_string(),
      });
    }

    Ok(stdout)
  }

  /// Run a command with its output passed through to the terminal.
  async fn run(&self, args: &[&str], shown: &str) -> Result<(), GatewayError> {
    let command = format!("{} {}", self.binary, shown);
    info!(command = %command, "running management command");

    let status = Command::new(&self.binary)
      .args(args)
      .status()
      .await
      .map_err(|source| GatewayError::Spawn {
        command: command.clone(),
        source,
      })?;

    if !status.success() {
      return Err(GatewayError::CommandFailed {
        command,
        code: status.code(),
        message: String::new(),
      });
    }
    Ok(())
  }
}

impl Management for CfCli {
  async fn service_guid(&self, name: &str) -> Result<String, GatewayError> {
    let args = ["service", name, "--guid"];
    let output = self.output(&args, &args.join(" ")).await?;
    output
      .lines()
      .map(str::trim)
      .find(|l| !l.is_empty())
      .map(str::to_string)
      .ok_or_else(|| GatewayError::UnknownService(name.to_string()))
  }

  async fn create_service(&self, offering: &str, plan: &str, instance: &str) -> Result<(), GatewayError> {
    let args = ["create-service", offering, plan, instance];
    self.run(&args, &args.join(" ")).await
  }

  async fn update_service_broker(&self, credentials: &BrokerCredentials, url: &str) -> Result<(), GatewayError> {
    let args = [
      "update-service-broker",
      credentials.broker.as_str(),
      credentials.username.as_str(),
      credentials.password.as_str(),
      url,
    ];
    let shown = format!(
      "update-service-broker {} {} ******** {}",
      credentials.broker, credentials.username, url
    );
    self.run(&args, &shown).await
  }

  async fn enable_service_access(&self, offering: &str) -> Result<(), GatewayError> {
    let args = ["enable-service-access", offering];
    self.run(&args, &args.join(" ")).await
  }

  async fn catalog_item_exists(&self, name: &str) -> Result<bool, GatewayError> {
    let args = ["marketplace", "-s", name];
    match self.output(&args, &args.join(" ")).await {
      Ok(output) => Ok(parse_marketplace_has_ok(&output)),
      // The marketplace exits non-zero for unknown offerings.
      Err(GatewayError::CommandFailed { .. }) => {
        debug!(name = %name, "marketplace lookup found nothing");
        Ok(false)
      }
      Err(e) => Err(e),
    }
  }

  async fn service_broker_url(&self, broker: &str) -> Result<String, GatewayError> {
    let output = self.output(&["service-brokers"], "service-brokers").await?;
    parse_broker_url(&output, broker).ok_or_else(|| GatewayError::UnknownBroker(broker.to_string()))
  }

  async fn push(&self, args: &[String], manifest: &Path) -> Result<(), GatewayError> {
    let manifest = manifest.to_string_lossy();
    let mut full: Vec<&str> = vec!["push"];
    full.extend(args.iter().map(String::as_str));
    full.extend(["-f", &*manifest]);
    self.run(&full, &full.join(" ")).await
  }
}

/// Whether marketplace output has a row whose first field is `OK`.
pub fn parse_marketplace_has_ok(output: &str) -> bool {
  output.lines().any(|line| line.split_whitespace().next() == Some("OK"))
}

/// Find the URL of `broker` in `service-brokers` output.
pub fn parse_broker_url(output: &str, broker: &str) -> Option<String> {
  output.lines().find_map(|line| {
    let mut fields = line.split_whitespace();
    match (fields.next(), fields.next()) {
      (Some(name), Some(url)) if name == broker => Some(url.to_string()),
      _ => None,
    }
  })
}
