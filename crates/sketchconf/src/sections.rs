//! Config sections. Everything here is fixed once the process starts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sketchfab REST API access.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the v3 API, without trailing slash.
    /// Default: https://api.sketchfab.com/v3
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,

    /// API token. Usually supplied via `--api-key` or `SKETCHFAB_API_KEY`
    /// rather than written to disk.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Timeout for search, model and download-link calls.
    /// Default: 30
    #[serde(default = "ApiConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.sketchfab.com/v3";

    fn default_base_url() -> String {
        Self::DEFAULT_BASE_URL.to_string()
    }

    fn default_timeout_secs() -> u64 {
        30
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            api_key: None,
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

// Hand-written so the key never ends up in logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Asset download behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Timeout for fetching the asset bytes from the signed URL.
    /// Default: 300
    #[serde(default = "DownloadConfig::default_timeout_secs")]
    pub timeout_secs: u64,

    /// Directory for downloads without an explicit output path.
    /// Default: the system temp directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Format requested when a download call does not name one.
    /// Default: gltf
    #[serde(default = "DownloadConfig::default_format")]
    pub default_format: String,
}

impl DownloadConfig {
    fn default_timeout_secs() -> u64 {
        300
    }

    fn default_format() -> String {
        "gltf".to_string()
    }

    /// Where downloads land when the caller gives no path.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout_secs(),
            output_dir: None,
            default_format: Self::default_format(),
        }
    }
}

/// Logging and trace export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// EnvFilter directive (trace, debug, info, warn, error, or full syntax).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,

    /// OTLP gRPC endpoint. Trace export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            otlp_endpoint: None,
        }
    }
}
