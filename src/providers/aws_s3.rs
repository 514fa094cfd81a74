//! Amazon S3 provider, optionally fronted by CloudFront.

use super::{Provider, origin};
use crate::config::S3Config;
use crate::error::CdnResult;

/// Serves assets from an S3 bucket endpoint or its CloudFront distribution.
#[derive(Debug, Clone)]
pub struct AwsS3Provider {
  base: String,
}

impl AwsS3Provider {
  /// Identifier matched against the `default` configuration key.
  pub const NAME: &'static str = "AwsS3";

  /// Build the provider from the top-level storage `url` and the S3 settings.
  ///
  /// With CloudFront enabled every URL points at the distribution host; otherwise the first
  /// configured bucket becomes a subdomain of the storage endpoint.
  pub fn new(url: &str, s3: &S3Config) -> CdnResult<Self> {
    let base = if s3.cloudfront.enabled {
      origin(&s3.cloudfront.cdn_url, None)?
    } else {
      origin(url, s3.bucket())?
    };
    Ok(Self { base })
  }
}

impl Provider for AwsS3Provider {
  fn name(&self) -> &'static str {
    Self::NAME
  }

  fn url_generator(&self, clean_path: &str) -> String {
    format!("{}/{}", self.base, clean_path)
  }
}
