use tracing::debug;

use super::{AwsS3Provider, Provider, StaticHostProvider};
use crate::config::CdnConfig;
use crate::error::{CdnError, CdnResult};

/// Selects and constructs the provider named by the configuration's `default` key.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderFactory;

impl ProviderFactory {
  /// Build the active provider.
  pub fn create(config: &CdnConfig) -> CdnResult<Box<dyn Provider>> {
    let provider: Box<dyn Provider> = match config.default.as_str() {
      AwsS3Provider::NAME => Box::new(AwsS3Provider::new(&config.url, &config.providers.aws.s3)?),
      StaticHostProvider::NAME => {
        Box::new(StaticHostProvider::new(&config.providers.static_host)?)
      }
      other => return Err(CdnError::UnknownProvider(other.to_string())),
    };
    debug!(provider = provider.name(), "selected CDN provider");
    Ok(provider)
  }
}
