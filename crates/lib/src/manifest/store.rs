//! Loading and saving manifest documents.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use super::types::{ManifestDocument, Node, UnsupportedKey};

/// Errors raised while reading or writing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse manifest {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_yaml::Error },

  #[error("invalid manifest {}: expected a mapping at the top level", path.display())]
  NotAMapping { path: PathBuf },

  #[error("invalid manifest {}: {source}", path.display())]
  UnsupportedKey { path: PathBuf, source: UnsupportedKey },

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[source] serde_yaml::Error),

  #[error("failed to write manifest {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },
}

impl ManifestDocument {
  /// Parse a document from YAML text. `origin` is only used in error messages.
  pub fn from_yaml_str(content: &str, origin: &Path) -> Result<Self, ManifestError> {
    let value: Value = serde_yaml::from_str(content).map_err(|source| ManifestError::Parse {
      path: origin.to_path_buf(),
      source,
    })?;

    let node = Node::try_from(value).map_err(|source| ManifestError::UnsupportedKey {
      path: origin.to_path_buf(),
      source,
    })?;

    match node {
      Node::Mapping(root) => Ok(ManifestDocument::new(root)),
      _ => Err(ManifestError::NotAMapping {
        path: origin.to_path_buf(),
      }),
    }
  }

  /// Render the document as YAML text.
  pub fn to_yaml_string(&self) -> Result<String, ManifestError> {
    serde_yaml::to_string(self.root()).map_err(ManifestError::Serialize)
  }
}

/// File-backed manifest store.
#[derive(Debug, Clone)]
pub struct ManifestStore {
  path: PathBuf,
}

impl ManifestStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Load the manifest from disk.
  pub fn load(&self) -> Result<ManifestDocument, ManifestError> {
    let content = fs::read_to_string(&self.path).map_err(|source| ManifestError::Read {
      path: self.path.clone(),
      source,
    })?;
    ManifestDocument::from_yaml_str(&content, &self.path)
  }

  /// Write `document` to a working file beside the manifest.
  ///
  /// The file is removed when the returned handle is dropped.
  pub fn save_transient(&self, document: &ManifestDocument) -> Result<TransientManifest, ManifestError> {
    let dir = match self.path.parent() {
      Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
      _ => PathBuf::from("."),
    };
    let content = document.to_yaml_string()?;

    let write_err = |source| ManifestError::Write {
      path: dir.clone(),
      source,
    };
    let mut file = tempfile::Builder::new()
      .prefix("manifest.")
      .suffix(".temp.yml")
      .tempfile_in(&dir)
      .map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;
    file.flush().map_err(write_err)?;

    debug!(path = ?file.path(), "wrote transient manifest");
    Ok(TransientManifest { file })
  }
}

/// A working copy of a manifest that is deleted on drop.
#[derive(Debug)]
pub struct TransientManifest {
  file: NamedTempFile,
}

impl TransientManifest {
  pub fn path(&self) -> &Path {
    self.file.path()
  }

  /// Delete the file now, reporting any failure.
  pub fn remove(self) -> Result<(), ManifestError> {
    let path = self.file.path().to_path_buf();
    self.file.close().map_err(|source| ManifestError::Write { path, source })
  }
}
