//! Configuration loading for sketchfab-mcp.
//!
//! Everything the server needs is resolved once at startup and never
//! re-read: the API credential, endpoint and timeouts, the download
//! directory, and logging settings.
//!
//! # Usage
//!
//! ```rust,no_run
//! use sketchconf::SketchConfig;
//!
//! let config = SketchConfig::load().expect("Failed to load config");
//! println!("API: {}", config.api.base_url);
//! println!("Downloads go to: {}", config.download.resolved_output_dir().display());
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/sketchfab-mcp/config.toml` (system)
//! 2. `~/.config/sketchfab-mcp/config.toml` (user)
//! 3. `./sketchfab-mcp.toml` (local override, replaced by `--config`)
//! 4. Environment variables (`SKETCHFAB_*`, `RUST_LOG`, `OTEL_EXPORTER_OTLP_ENDPOINT`)
//!
//! # Example Config
//!
//! ```toml
//! [api]
//! base_url = "https://api.sketchfab.com/v3"
//! timeout_secs = 30
//!
//! [download]
//! timeout_secs = 300
//! output_dir = "~/models/sketchfab"
//! default_format = "glb"
//!
//! [telemetry]
//! log_level = "info"
//! otlp_endpoint = "127.0.0.1:4317"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{ApiConfig, DownloadConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for environment variable {var}: {message}")]
    Env { var: String, message: String },
}

/// Complete sketchfab-mcp configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SketchConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl SketchConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/sketchfab-mcp/config.toml`
    /// 3. `~/.config/sketchfab-mcp/config.toml`
    /// 4. `./sketchfab-mcp.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    ///
    /// If `config_path` is provided, it takes precedence over the local
    /// `./sketchfab-mcp.toml` override. System and user configs still load first.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = SketchConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources)?;

        Ok((config, sources))
    }

    /// Serialize config to TOML string. The API key is never written out.
    pub fn to_toml(&self) -> String {
        // Built by hand so optional fields show up as comments
        let mut output = String::new();

        output.push_str("# sketchfab-mcp configuration\n\n");

        output.push_str("[api]\n");
        output.push_str(&format!("base_url = {}\n", quoted(&self.api.base_url)));
        if self.api.api_key.is_some() {
            output.push_str("api_key = \"<redacted>\"\n");
        } else {
            output.push_str("# api_key = \"\"\n");
        }
        output.push_str(&format!("timeout_secs = {}\n", self.api.timeout_secs));

        output.push_str("\n[download]\n");
        output.push_str(&format!("timeout_secs = {}\n", self.download.timeout_secs));
        match &self.download.output_dir {
            Some(dir) => output.push_str(&format!(
                "output_dir = {}\n",
                quoted(&dir.display().to_string())
            )),
            None => output.push_str(&format!(
                "# output_dir = {}\n",
                quoted(&self.download.resolved_output_dir().display().to_string())
            )),
        }
        output.push_str(&format!(
            "default_format = {}\n",
            quoted(&self.download.default_format)
        ));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = {}\n", quoted(&self.telemetry.log_level)));
        match &self.telemetry.otlp_endpoint {
            Some(endpoint) => {
                output.push_str(&format!("otlp_endpoint = {}\n", quoted(endpoint)))
            }
            None => output.push_str("# otlp_endpoint = \"127.0.0.1:4317\"\n"),
        }

        output
    }
}

/// A TOML string literal, escaped as needed.
fn quoted(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
