//! Configuration types for imgsrc-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Default fallback proxy. The target URL is appended as `?quest=<encoded-url>`.
pub const DEFAULT_PROXY_BASE: &str = "https://api.codetabs.com/v1/proxy/";

/// Network transport configuration (proxy fallback, timeouts)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Base URL of the fallback proxy (default: codetabs proxy)
    #[serde(default = "default_proxy_base")]
    pub proxy_base: String,

    /// Per-request timeout (None = no timeout, the transport may hang indefinitely)
    #[serde(default, with = "optional_duration_serde")]
    pub request_timeout: Option<Duration>,

    /// User-Agent header sent with every request (None = reqwest default)
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            proxy_base: default_proxy_base(),
            request_timeout: None,
            user_agent: None,
        }
    }
}

/// Batch scheduling configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of items in flight at once (default: 5)
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// Minimum spacing between two dispatches (default: 250ms)
    #[serde(default = "default_dispatch_interval", with = "duration_millis_serde")]
    pub dispatch_interval: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            dispatch_interval: default_dispatch_interval(),
        }
    }
}

/// Compression applied to archive entries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveCompression {
    /// Store entries uncompressed
    Stored,
    /// Deflate entries (default)
    #[default]
    Deflated,
}

impl From<ArchiveCompression> for zip::CompressionMethod {
    fn from(c: ArchiveCompression) -> Self {
        match c {
            ArchiveCompression::Stored => zip::CompressionMethod::Stored,
            ArchiveCompression::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// Archive output configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Directory the finished archive is written to (default: ".")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Archive filename prefix (default: "images")
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Entry compression
    #[serde(default)]
    pub compression: ArchiveCompression,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
            compression: ArchiveCompression::default(),
        }
    }
}

/// Main configuration for ImageBatchDownloader
///
/// Sub-configs are flattened, so the serialized form is a single flat object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Transport settings
    #[serde(flatten)]
    pub transport: TransportConfig,

    /// Scheduling settings
    #[serde(flatten)]
    pub batch: BatchConfig,

    /// Archive settings
    #[serde(flatten)]
    pub archive: ArchiveConfig,
}

impl Config {
    /// Check that the configuration can drive a batch
    pub fn validate(&self) -> Result<()> {
        if self.batch.concurrency_limit == 0 {
            return Err(Error::Config {
                message: "concurrency limit must be at least 1".to_string(),
                key: Some("concurrency_limit".to_string()),
            });
        }

        if let Err(e) = url::Url::parse(&self.transport.proxy_base) {
            return Err(Error::Config {
                message: format!("invalid proxy base '{}': {}", self.transport.proxy_base, e),
                key: Some("proxy_base".to_string()),
            });
        }

        if self.archive.file_prefix.trim().is_empty() {
            return Err(Error::Config {
                message: "archive file prefix must not be empty".to_string(),
                key: Some("file_prefix".to_string()),
            });
        }

        Ok(())
    }
}

fn default_proxy_base() -> String {
    DEFAULT_PROXY_BASE.to_string()
}

fn default_concurrency_limit() -> usize {
    5
}

fn default_dispatch_interval() -> Duration {
    Duration::from_millis(250)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_prefix() -> String {
    "images".to_string()
}

// Duration serialization helper (milliseconds)
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Optional Duration serialization helper (seconds)
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
