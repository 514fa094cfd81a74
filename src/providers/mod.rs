//! CDN providers and the factory that selects the active one from configuration.

mod aws_s3;
mod factory;
mod static_host;

pub use aws_s3::AwsS3Provider;
pub use factory::ProviderFactory;
pub use static_host::StaticHostProvider;

use url::Url;

use crate::error::{CdnError, CdnResult};

/// A strategy that turns a clean, project-relative path into a public CDN URL.
pub trait Provider: Send + Sync + std::fmt::Debug {
  /// Identifier used in configuration and logs.
  fn name(&self) -> &'static str;

  /// Build the public URL for `clean_path`, which carries no leading separator.
  fn url_generator(&self, clean_path: &str) -> String;
}

/// Parse `raw` and return its `scheme://host[:port]` origin, optionally prefixing the host.
pub(crate) fn origin(raw: &str, host_prefix: Option<&str>) -> CdnResult<String> {
  let url = Url::parse(raw).map_err(|source| CdnError::InvalidUrl {
    url: raw.to_string(),
    source,
  })?;
  let host = url
    .host_str()
    .ok_or_else(|| CdnError::MissingHost(raw.to_string()))?;

  let mut origin = format!("{}://", url.scheme());
  if let Some(prefix) = host_prefix {
    origin.push_str(prefix);
    origin.push('.');
  }
  origin.push_str(host);
  if let Some(port) = url.port() {
    origin.push_str(&format!(":{port}"));
  }
  Ok(origin)
}
