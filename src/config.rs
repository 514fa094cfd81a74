//! CDN configuration loader.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// File name searched for by [`CdnConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "cdn.config.json";

/// Top-level CDN configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CdnConfig {
    /// Serve assets from the local host instead of the CDN.
    pub bypass: bool,
    /// Identifier of the active provider, e.g. `AwsS3`.
    pub default: String,
    /// Base storage endpoint used by providers that build bucket URLs.
    pub url: String,
    /// Provider-specific settings.
    pub providers: ProvidersConfig,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            bypass: false,
            default: "AwsS3".into(),
            url: "https://s3.amazonaws.com".into(),
            providers: ProvidersConfig::default(),
        }
    }
}

/// Settings for every supported provider; only the active one is consulted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Amazon Web Services settings.
    pub aws: AwsConfig,
    /// Plain base-URL host settings.
    #[serde(rename = "static")]
    pub static_host: StaticHostConfig,
}

/// Amazon Web Services provider group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// S3 bucket settings.
    pub s3: S3Config,
}

/// S3 bucket and CloudFront distribution settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct S3Config {
    /// Bucket region.
    pub region: String,
    /// Buckets paired with the asset patterns they hold, in file order. The first bucket serves
    /// URLs.
    #[serde(deserialize_with = "ordered_pairs")]
    pub buckets: Vec<(String, String)>,
    /// CloudFront distribution fronting the bucket.
    pub cloudfront: CloudFrontConfig,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: "us-east-1".into(),
            buckets: Vec::new(),
            cloudfront: CloudFrontConfig::default(),
        }
    }
}

impl S3Config {
    /// Bucket used when generating URLs, if any is configured.
    pub fn bucket(&self) -> Option<&str> {
        self.buckets
            .iter()
            .map(|(bucket, _)| bucket.trim().trim_end_matches('/'))
            .find(|bucket| !bucket.is_empty())
    }
}

/// Deserialize a JSON object into its key/value pairs, keeping the order they were written in.
fn ordered_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of bucket names to asset patterns")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(pair) = map.next_entry::<String, String>()? {
                pairs.push(pair);
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairsVisitor)
}

/// CloudFront settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CloudFrontConfig {
    /// Serve through the distribution rather than the bucket endpoint.
    #[serde(rename = "use")]
    pub enabled: bool,
    /// Distribution URL, e.g. `https://d1234.cloudfront.net`.
    pub cdn_url: String,
}

/// Settings for a CDN reachable at a fixed base URL.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StaticHostConfig {
    /// Base URL; may contain `{bucket}` and `{path}` placeholders.
    pub base_url: String,
    /// Value substituted for `{bucket}`.
    pub bucket: String,
}

impl CdnConfig {
    /// Load configuration from `dir`, falling back to defaults when no file exists.
    ///
    /// A file that exists but cannot be read or parsed is still an error, so a typo in the
    /// configuration never silently disables the CDN.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        match fs::read_to_string(&candidate) {
            Ok(content) => Self::from_str_at(&content, &candidate),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io {
                path: candidate,
                source: err,
            }),
        }
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
        Self::from_str_at(&content, path)
    }

    fn from_str_at(content: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|err| ConfigError::Parse {
            path: PathBuf::from(path),
            source: err,
        })
    }
}
