//! Provider for CDNs reachable at a fixed base URL.

use url::Url;

use super::Provider;
use crate::config::StaticHostConfig;
use crate::error::{CdnError, CdnResult};

/// Joins a configured base URL with the asset path.
///
/// The base may template the bucket and path, as in `https://{bucket}.example.com/{path}`. Without
/// a `{path}` placeholder the path is appended after a single `/`.
#[derive(Debug, Clone)]
pub struct StaticHostProvider {
  template: String,
}

impl StaticHostProvider {
  /// Identifier matched against the `default` configuration key.
  pub const NAME: &'static str = "Static";

  /// Build the provider, validating that the expanded base is an absolute URL.
  pub fn new(config: &StaticHostConfig) -> CdnResult<Self> {
    let with_bucket = config.base_url.replace("{bucket}", &config.bucket);
    let template = if with_bucket.contains("{path}") {
      with_bucket
    } else {
      format!("{}/{{path}}", with_bucket.trim_end_matches('/'))
    };

    let probe = template.replace("{path}", "");
    Url::parse(&probe).map_err(|source| CdnError::InvalidUrl {
      url: config.base_url.clone(),
      source,
    })?;

    Ok(Self { template })
  }
}

impl Provider for StaticHostProvider {
  fn name(&self) -> &'static str {
    Self::NAME
  }

  fn url_generator(&self, clean_path: &str) -> String {
    self.template.replace("{path}", clean_path)
  }
}
