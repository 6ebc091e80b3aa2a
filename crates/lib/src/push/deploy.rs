use tracing::{info, warn};

use super::PushError;
use crate::gateway::Management;
use crate::manifest::{ManifestDocument, ManifestStore};

/// Write `document` beside the manifest and push with it.
///
/// The working file is removed whether or not the push succeeds. The original
/// manifest is never modified.
pub async fn deploy<M: Management>(
  management: &M,
  store: &ManifestStore,
  document: &ManifestDocument,
  args: &[String],
) -> Result<(), PushError> {
  let transient = store.save_transient(document)?;
  info!(manifest = ?transient.path(), args = ?args, "pushing application");

  let pushed = management.push(args, transient.path()).await;

  if let Err(e) = transient.remove() {
    warn!(error = %e, "failed to remove working manifest");
  }

  pushed.map_err(PushError::from)
}
