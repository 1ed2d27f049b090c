//! Tool implementations.
//!
//! Each tool is an async method on [`ToolContext`] that never fails: every
//! error is caught here and turned into a [`ToolReply`] the agent can read.

mod details;
mod download;
mod search;

pub use download::{destination_path, sanitize_name, DownloadOptions};
pub use search::{MISSING_CRITERIA, NO_RESULTS};

use std::path::{Path, PathBuf};

use rmcp::model::{CallToolResult, Content};
use sketchfab_api::{ApiError, ModelFormat, ModelSummary, SketchfabClient};

use crate::settings::ServerSettings;

/// Answer for any tool called without a configured credential.
pub const MISSING_API_KEY: &str = "Sketchfab API key not provided. Please set the SKETCHFAB_API_KEY environment variable or pass --api-key when starting the server.";

/// Text result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReply {
    pub text: String,
    /// Set for caught failures. Guidance messages are ordinary results.
    pub is_error: bool,
}

impl ToolReply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

impl From<ToolReply> for CallToolResult {
    fn from(reply: ToolReply) -> Self {
        let content = vec![Content::text(reply.text)];
        if reply.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

/// Immutable state shared by all tool calls.
#[derive(Debug)]
pub struct ToolContext {
    /// Absent when no API key was configured.
    client: Option<SketchfabClient>,
    download_dir: PathBuf,
    default_format: ModelFormat,
}

impl ToolContext {
    pub fn new(settings: &ServerSettings) -> Result<Self, ApiError> {
        let client = settings
            .api_key
            .clone()
            .map(|key| SketchfabClient::new(key, settings.client.clone()))
            .transpose()?;

        Ok(Self {
            client,
            download_dir: settings.download_dir.clone(),
            default_format: settings.default_format,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.client.is_some()
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn default_format(&self) -> ModelFormat {
        self.default_format
    }

    fn client(&self) -> Option<&SketchfabClient> {
        self.client.as_ref()
    }
}

/// Name to show for a model; falls back to the uid for unnamed ones.
fn display_name(model: &ModelSummary) -> &str {
    let name = model.name.trim();
    if name.is_empty() {
        &model.uid
    } else {
        name
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchconf::SketchConfig;

    #[test]
    fn test_reply_maps_error_flag() {
        let ok: CallToolResult = ToolReply::ok("fine").into();
        assert_eq!(ok.is_error, Some(false));

        let err: CallToolResult = ToolReply::error("broken").into();
        assert_eq!(err.is_error, Some(true));
    }

    #[test]
    fn test_context_without_key_has_no_client() {
        let settings = ServerSettings::from_config(&SketchConfig::default()).unwrap();
        let context = ToolContext::new(&settings).unwrap();
        assert!(!context.has_credentials());
        assert_eq!(context.default_format(), ModelFormat::Gltf);
    }

    #[tokio::test]
    async fn test_every_tool_asks_for_a_key() {
        let settings = ServerSettings::from_config(&SketchConfig::default()).unwrap();
        let context = ToolContext::new(&settings).unwrap();

        let search = context
            .search(sketchfab_api::SearchQuery {
                query: Some("chair".into()),
                ..Default::default()
            })
            .await;
        let details = context.model_details("abc123").await;
        let download = context
            .download(DownloadOptions {
                model_id: "abc123".into(),
                format: None,
                output_path: None,
            })
            .await;

        for reply in [search, details, download] {
            assert_eq!(reply, ToolReply::ok(MISSING_API_KEY));
        }
    }
}
