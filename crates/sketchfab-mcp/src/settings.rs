//! Startup settings: config files + env (via sketchconf), then CLI flags.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use sketchconf::SketchConfig;
use sketchfab_api::{ApiKey, ClientConfig, ModelFormat};

/// Values given on the command line. They beat both env and files.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub otlp_endpoint: Option<String>,
}

impl CliOverrides {
    /// Fold the flags into an already-loaded config. Blank flags are ignored.
    pub fn apply(&self, config: &mut SketchConfig) {
        if let Some(key) = non_blank(&self.api_key) {
            config.api.api_key = Some(key.to_string());
        }
        if let Some(url) = non_blank(&self.base_url) {
            config.api.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(endpoint) = non_blank(&self.otlp_endpoint) {
            config.telemetry.otlp_endpoint = Some(endpoint.to_string());
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Everything the tool handlers need, resolved once.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// `None` means tools answer with setup guidance instead of calling out.
    pub api_key: Option<ApiKey>,
    pub client: ClientConfig,
    pub download_dir: PathBuf,
    pub default_format: ModelFormat,
}

impl ServerSettings {
    pub fn from_config(config: &SketchConfig) -> Result<Self> {
        let default_format: ModelFormat = config
            .download
            .default_format
            .parse()
            .map_err(|e: String| anyhow!("Invalid [download] default_format: {}", e))?;

        Ok(Self {
            api_key: config.api.api_key.clone().and_then(ApiKey::new),
            client: ClientConfig::from(config),
            download_dir: config.download.resolved_output_dir(),
            default_format,
        })
    }
}
