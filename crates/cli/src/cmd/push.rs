//! Implementation of the `cf-brooklyn push` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use brooklyn_lib::manifest::ManifestStore;
use brooklyn_lib::push::{PushOptions, push};

use super::Session;
use crate::BrokerArgs;
use crate::output::{format_duration, print_info, print_stat, print_success, symbols};

/// Execute the push command.
///
/// Provisions the manifest's inline services, waits for them, then runs
/// `cf push` with `args` against a rewritten copy of the manifest. The
/// manifest on disk is left untouched.
pub fn cmd_push(manifest: Option<PathBuf>, broker: BrokerArgs, args: Vec<String>) -> Result<()> {
  let session = Session::new()?;
  let path = manifest.unwrap_or_else(|| session.config.manifest_path());
  let display_path = dunce::canonicalize(&path).unwrap_or_else(|_| path.clone());

  print_info(&format!("Using manifest {}", display_path.display()));

  let store = ManifestStore::new(path);
  let options = PushOptions {
    push_args: args,
    poll_unit: session.config.poll_unit(),
  };
  let credentials = session.credentials(broker);

  let outcome = session
    .runtime
    .block_on(push(&session.cf, &credentials, &store, &options))
    .context("Push failed")?;

  if !outcome.created.is_empty() {
    println!();
    println!("Services created:");
    for name in outcome.created.iter() {
      println!("  {} {}", symbols::ARROW, name);
    }
    let waited = outcome.readiness.waits.iter().sum();
    print_stat("Readiness checks", &outcome.readiness.cycles.to_string());
    print_stat("Waited", &format_duration(waited));
    println!();
  }

  print_success("Push complete");
  Ok(())
}
