//! Reading build-tool manifests from disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ManifestLoadError;

/// Mapping of logical asset names to the versioned files a build tool emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
  entries: BTreeMap<String, String>,
}

impl AssetManifest {
  /// Parse a manifest from its JSON text.
  pub fn from_json(content: &str) -> Result<Self, ManifestLoadError> {
    Ok(serde_json::from_str(content)?)
  }

  /// Exact lookup of a single key.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.get(key).map(String::as_str)
  }

  /// Number of entries in the manifest.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns true when the manifest has no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<K, V> FromIterator<(K, V)> for AssetManifest
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      entries: iter
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect(),
    }
  }
}

/// Source of manifest contents, keyed by the manifest's relative path.
pub trait ManifestLoader: Send + Sync {
  /// Load and parse the manifest identified by `manifest_path`.
  fn load(&self, manifest_path: &Path) -> Result<AssetManifest, ManifestLoadError>;
}

/// Loads manifests from the public directory of a project.
#[derive(Debug, Clone)]
pub struct FsManifestLoader {
  public_dir: PathBuf,
}

impl FsManifestLoader {
  /// Create a loader resolving manifest paths against `public_dir`.
  pub fn new(public_dir: impl Into<PathBuf>) -> Self {
    Self {
      public_dir: public_dir.into(),
    }
  }

  /// Directory manifest paths are resolved against.
  pub fn public_dir(&self) -> &Path {
    &self.public_dir
  }
}

impl ManifestLoader for FsManifestLoader {
  fn load(&self, manifest_path: &Path) -> Result<AssetManifest, ManifestLoadError> {
    let content = fs::read_to_string(self.public_dir.join(manifest_path))?;
    AssetManifest::from_json(&content)
  }
}
