//! sketchfab-mcp - MCP server for the Sketchfab 3D model catalog
//!
//! Subcommands:
//! - `sketchfab-mcp stdio` - Serve MCP over stdin/stdout (default)
//! - `sketchfab-mcp config` - Print the effective configuration

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sketchconf::{ConfigSources, SketchConfig};
use sketchfab_mcp::{stdio, telemetry, CliOverrides, ServerSettings};

#[derive(Parser)]
#[command(name = "sketchfab-mcp")]
#[command(about = "MCP server for searching, inspecting and downloading Sketchfab models")]
#[command(version)]
struct Cli {
    /// Sketchfab API token (overrides SKETCHFAB_API_KEY and config files)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Config file to use instead of ./sketchfab-mcp.toml
    #[arg(short, long, env = "SKETCHFAB_MCP_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Sketchfab API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// OTLP gRPC endpoint for trace export (e.g., "localhost:4317")
    #[arg(long, global = true)]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout (for Claude Desktop and other stdio clients)
    Stdio,

    /// Print the effective configuration as TOML (API key redacted)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }

    let (mut config, sources) = SketchConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    CliOverrides {
        api_key: cli.api_key,
        base_url: cli.base_url,
        otlp_endpoint: cli.otlp_endpoint,
    }
    .apply(&mut config);

    match cli.command.unwrap_or(Commands::Stdio) {
        Commands::Stdio => {
            let _telemetry = telemetry::init(&config.telemetry)?;
            let settings = ServerSettings::from_config(&config)?;
            stdio::run(settings).await?;
        }
        Commands::Config => print_config(&config, &sources),
    }

    Ok(())
}

fn print_config(config: &SketchConfig, sources: &ConfigSources) {
    print!("{}", config.to_toml());

    println!();
    if sources.files.is_empty() {
        println!("# No config files loaded (using defaults)");
    } else {
        println!("# Loaded from:");
        for file in &sources.files {
            println!("#   {}", file.display());
        }
    }
    if !sources.env_overrides.is_empty() {
        println!("# Environment overrides:");
        for var in &sources.env_overrides {
            println!("#   {}", var);
        }
    }
}
