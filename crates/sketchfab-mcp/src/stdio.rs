//! Stdio MCP transport.
//!
//! stdout carries JSON-RPC only; logs go to stderr (see `telemetry`).

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};
use tracing::{info, warn};

use crate::server::SketchfabServer;
use crate::settings::ServerSettings;
use crate::tools::ToolContext;

/// Serve the three tools over stdin/stdout until EOF.
pub async fn run(settings: ServerSettings) -> Result<()> {
    let context = ToolContext::new(&settings).context("Failed to create Sketchfab client")?;

    if context.has_credentials() {
        info!(
            base_url = %settings.client.base_url,
            download_dir = %context.download_dir().display(),
            "Sketchfab client ready"
        );
    } else {
        warn!("No Sketchfab API key configured; tools will reply with setup instructions");
    }

    let server = SketchfabServer::new(Arc::new(context));

    // rmcp handles JSON-RPC framing
    let service = server
        .serve(stdio())
        .await
        .context("Failed to start stdio MCP service")?;

    info!("Stdio MCP server running");

    // EOF or error
    service.waiting().await?;

    info!("Stdio MCP server shutdown");
    Ok(())
}
