//! Memoised manifest lookups.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::loader::{AssetManifest, ManifestLoader};
use crate::error::{CdnError, CdnResult};

/// Load slot for one manifest file; empty until the first successful load.
type ManifestSlot = Arc<Mutex<Option<Arc<AssetManifest>>>>;

/// Resolves logical asset names through build manifests, loading each manifest at most once.
///
/// Parsed manifests are kept for the lifetime of the resolver and never invalidated; build a new
/// resolver to pick up manifest changes. Failed loads are not cached.
pub struct ManifestResolver {
  loader: Box<dyn ManifestLoader>,
  slots: Mutex<HashMap<PathBuf, ManifestSlot>>,
}

impl ManifestResolver {
  /// Create a resolver backed by `loader`.
  pub fn new(loader: impl ManifestLoader + 'static) -> Self {
    Self {
      loader: Box::new(loader),
      slots: Mutex::new(HashMap::new()),
    }
  }

  /// Look up `lookup_key` in the manifest at `manifest_path`.
  ///
  /// The key is tried with a leading `/` first and then verbatim.
  pub fn resolve(&self, manifest_path: &Path, lookup_key: &str) -> CdnResult<Option<String>> {
    let manifest = self.manifest(manifest_path)?;
    let resolved = manifest
      .get(&format!("/{lookup_key}"))
      .or_else(|| manifest.get(lookup_key))
      .map(str::to_string);
    Ok(resolved)
  }

  /// Look up `lookup_key` verbatim, without the slash-prefixed variant.
  pub fn resolve_exact(
    &self,
    manifest_path: &Path,
    lookup_key: &str,
  ) -> CdnResult<Option<String>> {
    let manifest = self.manifest(manifest_path)?;
    Ok(manifest.get(lookup_key).map(str::to_string))
  }

  /// Return the cached manifest for `manifest_path`, loading it on first use.
  pub fn manifest(&self, manifest_path: &Path) -> CdnResult<Arc<AssetManifest>> {
    let slot = self.slot(manifest_path);
    // Only callers of this manifest wait here while it loads.
    let mut cached = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(manifest) = cached.as_ref() {
      return Ok(Arc::clone(manifest));
    }

    let manifest = self
      .loader
      .load(manifest_path)
      .map_err(|source| CdnError::ManifestLoad {
        path: manifest_path.to_path_buf(),
        source,
      })?;
    debug!(
      manifest = %manifest_path.display(),
      entries = manifest.len(),
      "loaded asset manifest"
    );

    let manifest = Arc::new(manifest);
    *cached = Some(Arc::clone(&manifest));
    Ok(manifest)
  }

  fn slot(&self, manifest_path: &Path) -> ManifestSlot {
    let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(slots.entry(manifest_path.to_path_buf()).or_default())
  }
}

impl std::fmt::Debug for ManifestResolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let known: Vec<PathBuf> = self
      .slots
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .keys()
      .cloned()
      .collect();
    f.debug_struct("ManifestResolver")
      .field("manifests", &known)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::error::ManifestLoadError;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::mpsc::{self, Receiver, Sender};
  use std::thread;
  use std::time::Duration;

  /// In-memory loader that counts how often each manifest is read.
  #[derive(Clone, Default)]
  pub(crate) struct CountingLoader {
    manifests: HashMap<PathBuf, AssetManifest>,
    pub(crate) loads: Arc<AtomicUsize>,
  }

  impl CountingLoader {
    pub(crate) fn with(mut self, path: &str, manifest: AssetManifest) -> Self {
      self.manifests.insert(PathBuf::from(path), manifest);
      self
    }

    pub(crate) fn load_count(&self) -> usize {
      self.loads.load(Ordering::SeqCst)
    }
  }

  impl ManifestLoader for CountingLoader {
    fn load(&self, manifest_path: &Path) -> Result<AssetManifest, ManifestLoadError> {
      self.loads.fetch_add(1, Ordering::SeqCst);
      self.manifests.get(manifest_path).cloned().ok_or_else(|| {
        ManifestLoadError::Io(std::io::Error::new(
          std::io::ErrorKind::NotFound,
          "no such manifest",
        ))
      })
    }
  }

  fn mix() -> AssetManifest {
    [("/app.js", "app.abc123.js"), ("vendor.js", "vendor.def456.js")]
      .into_iter()
      .collect()
  }

  #[test]
  fn prefers_slash_prefixed_key() {
    let manifest: AssetManifest = [("/app.js", "slashed.js"), ("app.js", "bare.js")]
      .into_iter()
      .collect();
    let resolver = ManifestResolver::new(CountingLoader::default().with("m.json", manifest));

    let resolved = resolver.resolve(Path::new("m.json"), "app.js").unwrap();
    assert_eq!(resolved.as_deref(), Some("slashed.js"));
  }

  #[test]
  fn falls_back_to_raw_key() {
    let resolver = ManifestResolver::new(CountingLoader::default().with("m.json", mix()));
    let resolved = resolver.resolve(Path::new("m.json"), "vendor.js").unwrap();
    assert_eq!(resolved.as_deref(), Some("vendor.def456.js"));
  }

  #[test]
  fn exact_lookup_skips_slash_prefixed_key() {
    let manifest: AssetManifest = [("/app.css", "slashed.css"), ("app.css", "bare.css")]
      .into_iter()
      .collect();
    let resolver = ManifestResolver::new(CountingLoader::default().with("m.json", manifest));

    let m = Path::new("m.json");
    assert_eq!(resolver.resolve_exact(m, "app.css").unwrap().as_deref(), Some("bare.css"));
    assert_eq!(resolver.resolve_exact(m, "/missing.css").unwrap(), None);
  }

  #[test]
  fn reports_absent_keys_as_none() {
    let resolver = ManifestResolver::new(CountingLoader::default().with("m.json", mix()));
    assert_eq!(resolver.resolve(Path::new("m.json"), "missing.js").unwrap(), None);
  }

  #[test]
  fn loads_each_manifest_once() {
    let loader = CountingLoader::default()
      .with("a.json", mix())
      .with("b.json", AssetManifest::default());
    let resolver = ManifestResolver::new(loader.clone());

    resolver.resolve(Path::new("a.json"), "app.js").unwrap();
    resolver.resolve(Path::new("a.json"), "vendor.js").unwrap();
    assert_eq!(loader.load_count(), 1);

    resolver.resolve(Path::new("b.json"), "app.js").unwrap();
    resolver.resolve(Path::new("b.json"), "app.js").unwrap();
    assert_eq!(loader.load_count(), 2);
  }

  #[test]
  fn load_failures_propagate_and_are_retried() {
    let loader = CountingLoader::default();
    let resolver = ManifestResolver::new(loader.clone());

    for _ in 0..2 {
      let err = resolver.resolve(Path::new("missing.json"), "app.js").unwrap_err();
      assert!(matches!(err, CdnError::ManifestLoad { .. }));
    }
    assert_eq!(loader.load_count(), 2);
  }

  #[test]
  fn concurrent_first_access_loads_once() {
    let loader = CountingLoader::default().with("m.json", mix());
    let resolver = Arc::new(ManifestResolver::new(loader.clone()));

    let handles: Vec<_> = (0..8)
      .map(|_| {
        let resolver = Arc::clone(&resolver);
        thread::spawn(move || resolver.resolve(Path::new("m.json"), "app.js").unwrap())
      })
      .collect();
    for handle in handles {
      assert_eq!(handle.join().unwrap().as_deref(), Some("app.abc123.js"));
    }

    assert_eq!(loader.load_count(), 1);
  }

  /// Loader that parks inside `load` for one manifest until released.
  struct GatedLoader {
    gated: PathBuf,
    started: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
  }

  impl ManifestLoader for GatedLoader {
    fn load(&self, manifest_path: &Path) -> Result<AssetManifest, ManifestLoadError> {
      if manifest_path == self.gated {
        self.started.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
      }
      Ok(mix())
    }
  }

  #[test]
  fn slow_load_does_not_block_other_manifests() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let resolver = Arc::new(ManifestResolver::new(GatedLoader {
      gated: PathBuf::from("slow.json"),
      started: Mutex::new(started_tx),
      release: Mutex::new(release_rx),
    }));

    resolver.resolve(Path::new("fast.json"), "app.js").unwrap();

    let slow = {
      let resolver = Arc::clone(&resolver);
      thread::spawn(move || resolver.resolve(Path::new("slow.json"), "app.js").unwrap())
    };
    started_rx.recv().unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    {
      let resolver = Arc::clone(&resolver);
      thread::spawn(move || {
        let _ = done_tx.send(resolver.resolve(Path::new("fast.json"), "vendor.js").unwrap());
      });
    }
    let fast = done_rx
      .recv_timeout(Duration::from_secs(5))
      .expect("cached manifest lookup waited on an unrelated load");
    assert_eq!(fast.as_deref(), Some("vendor.def456.js"));

    release_tx.send(()).unwrap();
    assert_eq!(slow.join().unwrap().as_deref(), Some("app.abc123.js"));
  }
}
