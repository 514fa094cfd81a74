//! Build-tool manifest loading and cached lookups.

mod loader;
mod resolver;

pub use loader::{AssetManifest, FsManifestLoader, ManifestLoader};
pub use resolver::ManifestResolver;

#[cfg(test)]
pub(crate) use resolver::tests::CountingLoader;
