//! Error types shared by the facade, manifest resolver, and provider factory.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type CdnResult<T> = Result<T, CdnError>;

/// Failures raised while turning an asset path into a URL.
#[derive(Debug, Error)]
pub enum CdnError {
  /// A path was required but missing or empty.
  #[error("Path does not exist.")]
  EmptyPath,

  /// The requested asset has no entry in the build manifest.
  #[error("File {path} not defined in asset manifest {}.", .manifest.display())]
  AssetNotInManifest {
    /// Logical asset path that was looked up.
    path: String,
    /// Manifest file the lookup ran against.
    manifest: PathBuf,
  },

  /// The configuration names a provider with no implementation.
  #[error("unknown CDN provider `{0}`")]
  UnknownProvider(String),

  /// A manifest file could not be read or parsed.
  #[error("failed to load asset manifest {}: {source}", .path.display())]
  ManifestLoad {
    /// Manifest file that failed to load.
    path: PathBuf,
    /// Underlying read or parse failure.
    #[source]
    source: ManifestLoadError,
  },

  /// A configured endpoint is not a valid URL.
  #[error("invalid URL `{url}`: {source}")]
  InvalidUrl {
    /// The offending configuration value.
    url: String,
    /// Parser failure.
    #[source]
    source: url::ParseError,
  },

  /// A configured endpoint parsed but carries no host.
  #[error("URL `{0}` has no host")]
  MissingHost(String),

  /// The configuration file could not be loaded.
  #[error(transparent)]
  Config(#[from] ConfigError),
}

/// Why a manifest file failed to load.
#[derive(Debug, Error)]
pub enum ManifestLoadError {
  /// Reading the file failed.
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
  /// The file is not a JSON object of strings.
  #[error("JSON error: {0}")]
  Parse(#[from] serde_json::Error),
}

/// Errors that can occur while loading the CDN configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  #[error("failed to read {}: {source}", .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to parse the JSON configuration file.
  #[error("failed to parse {}: {source}", .path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn manifest_miss_names_asset_and_manifest() {
    let err = CdnError::AssetNotInManifest {
      path: "app.js".into(),
      manifest: PathBuf::from("mix-manifest.json"),
    };
    assert_eq!(
      err.to_string(),
      "File app.js not defined in asset manifest mix-manifest.json."
    );
  }

  #[test]
  fn manifest_load_exposes_source() {
    let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = CdnError::ManifestLoad {
      path: PathBuf::from("build/rev-manifest.json"),
      source: ManifestLoadError::from(parse),
    };
    assert!(std::error::Error::source(&err).is_some());
    assert!(err.to_string().starts_with("failed to load asset manifest build/rev-manifest.json"));
  }
}
