#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod config;
pub mod error;
pub mod facade;
pub mod manifest;
pub mod providers;

pub use config::CdnConfig;
pub use error::{CdnError, CdnResult};
pub use facade::{CdnFacade, RequestContext, StaticRoot};
pub use manifest::{AssetManifest, FsManifestLoader, ManifestLoader, ManifestResolver};
pub use providers::{Provider, ProviderFactory};
