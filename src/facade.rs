//! The entry points templates call to turn asset paths into URLs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::asset_paths::prefixed_path;
use crate::config::CdnConfig;
use crate::error::{CdnError, CdnResult};
use crate::manifest::{FsManifestLoader, ManifestResolver};
use crate::providers::{Provider, ProviderFactory};

/// Manifest written by webpack mix, relative to the public directory.
pub const MIX_MANIFEST: &str = "mix-manifest.json";
/// Manifest written by elixir, relative to the public directory.
pub const ELIXIR_MANIFEST: &str = "build/rev-manifest.json";

const PUBLIC_PREFIX: &str = "public/";
const ELIXIR_BUILD_DIR: &str = "build/";

/// Access to the root URL of the request currently being served.
pub trait RequestContext: Send + Sync {
  /// Root URL without a trailing slash, e.g. `https://example.com`.
  fn root(&self) -> String;
}

/// A request root that never changes, useful for CLIs and single-host deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRoot(String);

impl StaticRoot {
  /// Wrap `root`, dropping any trailing slash.
  pub fn new(root: impl Into<String>) -> Self {
    let root = root.into();
    Self(root.trim_end_matches('/').to_string())
  }
}

impl RequestContext for StaticRoot {
  fn root(&self) -> String {
    self.0.clone()
  }
}

/// Rewrites local asset paths into CDN URLs, or into local URLs when bypassed.
///
/// Build one per process and share it; every collaborator is fixed at construction.
pub struct CdnFacade {
  config: CdnConfig,
  provider: Box<dyn Provider>,
  manifests: ManifestResolver,
  request: Arc<dyn RequestContext>,
}

impl CdnFacade {
  /// Build a facade whose provider is chosen by [`ProviderFactory`] and whose manifests are read
  /// from `public_dir`.
  pub fn new(
    config: CdnConfig,
    public_dir: impl Into<PathBuf>,
    request: Arc<dyn RequestContext>,
  ) -> CdnResult<Self> {
    let provider = ProviderFactory::create(&config)?;
    let manifests = ManifestResolver::new(FsManifestLoader::new(public_dir));
    Ok(Self::with_parts(config, provider, manifests, request))
  }

  /// Assemble a facade from explicit collaborators.
  pub fn with_parts(
    config: CdnConfig,
    provider: Box<dyn Provider>,
    manifests: ManifestResolver,
    request: Arc<dyn RequestContext>,
  ) -> Self {
    Self {
      config,
      provider,
      manifests,
      request,
    }
  }

  /// Configuration the facade was built with.
  pub fn config(&self) -> &CdnConfig {
    &self.config
  }

  /// The active provider.
  pub fn provider(&self) -> &dyn Provider {
    self.provider.as_ref()
  }

  /// URL for a file under the public directory. `public/` is added for the caller.
  pub fn asset<'a>(
    &self,
    path: impl Into<Option<&'a str>>,
    override_bypass: Option<bool>,
  ) -> CdnResult<String> {
    self.generate_url(path.into(), PUBLIC_PREFIX, override_bypass)
  }

  /// URL for a path relative to the project root.
  pub fn path<'a>(&self, path: impl Into<Option<&'a str>>) -> CdnResult<String> {
    self.generate_url(path.into(), "", None)
  }

  /// URL for a webpack mix asset, resolved through `mix-manifest.json`.
  pub fn mix(&self, path: &str) -> CdnResult<String> {
    let resolved = self.lookup(Path::new(MIX_MANIFEST), path, ManifestResolver::resolve)?;
    self.generate_url(Some(&resolved), PUBLIC_PREFIX, None)
  }

  /// URL for an elixir asset, resolved through `build/rev-manifest.json`.
  pub fn elixir(&self, path: &str) -> CdnResult<String> {
    // Elixir manifests only ever key assets by their bare name.
    let resolved = self.lookup(
      Path::new(ELIXIR_MANIFEST),
      path,
      ManifestResolver::resolve_exact,
    )?;
    let built = format!("{ELIXIR_BUILD_DIR}{resolved}");
    self.generate_url(Some(&built), PUBLIC_PREFIX, None)
  }

  fn lookup(
    &self,
    manifest: &Path,
    path: &str,
    resolve: fn(&ManifestResolver, &Path, &str) -> CdnResult<Option<String>>,
  ) -> CdnResult<String> {
    resolve(&self.manifests, manifest, path)?
      .ok_or_else(|| CdnError::AssetNotInManifest {
        path: path.to_string(),
        manifest: manifest.to_path_buf(),
      })
  }

  fn generate_url(
    &self,
    path: Option<&str>,
    prepend: &str,
    override_bypass: Option<bool>,
  ) -> CdnResult<String> {
    let bypass = override_bypass.unwrap_or(self.config.bypass);
    if bypass {
      // Bypassed paths are served as given: no cleaning, no prefix.
      let url = format!("{}/{}", self.request.root(), path.unwrap_or_default());
      debug!(%url, "CDN bypassed");
      return Ok(url);
    }

    let path = path.filter(|path| !path.is_empty()).ok_or(CdnError::EmptyPath)?;
    let clean_path = prefixed_path(prepend, path);
    let url = self.provider.url_generator(&clean_path);
    trace!(provider = self.provider.name(), %clean_path, %url, "generated CDN URL");
    Ok(url)
  }
}

impl std::fmt::Debug for CdnFacade {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CdnFacade")
      .field("config", &self.config)
      .field("provider", &self.provider)
      .field("manifests", &self.manifests)
      .finish_non_exhaustive()
  }
}
