mod cmd;
mod output;
mod prompts;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::print_error;

/// cf-brooklyn - provision Brooklyn blueprints alongside `cf push`
#[derive(Parser)]
#[command(name = "cf-brooklyn")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

/// Broker credentials. Anything left out is taken from the environment or
/// profile, then prompted for.
#[derive(Args, Debug, Clone, Default)]
pub struct BrokerArgs {
  /// Name of the service broker
  #[arg(long)]
  pub broker: Option<String>,

  /// Broker username
  #[arg(long)]
  pub username: Option<String>,

  /// Broker password
  #[arg(long)]
  pub password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
  /// Provision inline services, wait for them, then `cf push`
  Push {
    /// Manifest to read (default: manifest.yml, or the profile's manifest)
    #[arg(short = 'f', long = "manifest")]
    manifest: Option<PathBuf>,

    #[command(flatten)]
    broker: BrokerArgs,

    /// Arguments passed through to `cf push`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
  },

  /// Register a catalog item from a YAML file
  AddCatalog {
    #[command(flatten)]
    broker: BrokerArgs,

    /// Catalog YAML file
    file: PathBuf,
  },

  /// Remove a catalog item
  DeleteCatalog {
    #[command(flatten)]
    broker: BrokerArgs,

    /// Catalog item name
    name: String,

    /// Catalog item version
    version: String,
  },

  /// List the effectors of a service's entities
  Effectors {
    #[command(flatten)]
    broker: BrokerArgs,

    /// Service instance name
    service: String,
  },

  /// Invoke an effector on a service
  Invoke {
    #[command(flatten)]
    broker: BrokerArgs,

    /// Service instance name
    service: String,

    /// Effector as <entity-type>:<effector>
    effector: String,

    /// Effector parameters as --name value pairs
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    params: Vec<String>,
  },

  /// Show the sensor values of a service's entities
  Sensors {
    #[command(flatten)]
    broker: BrokerArgs,

    /// Service instance name
    service: String,
  },

  /// Check once whether a service is running
  Ready {
    #[command(flatten)]
    broker: BrokerArgs,

    /// Service instance name
    service: String,
  },
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Push { manifest, broker, args } => cmd::cmd_push(manifest, broker, args),
    Commands::AddCatalog { broker, file } => cmd::cmd_add_catalog(broker, &file),
    Commands::DeleteCatalog { broker, name, version } => cmd::cmd_delete_catalog(broker, &name, &version),
    Commands::Effectors { broker, service } => cmd::cmd_effectors(broker, &service),
    Commands::Invoke {
      broker,
      service,
      effector,
      params,
    } => cmd::cmd_invoke(broker, &service, &effector, &params),
    Commands::Sensors { broker, service } => cmd::cmd_sensors(broker, &service),
    Commands::Ready { broker, service } => cmd::cmd_ready(broker, &service),
  };

  if let Err(e) = result {
    print_error(&format!("{:#}", e));
    std::process::exit(1);
  }
}
