//! sketchfab-mcp - MCP tools for the Sketchfab 3D model catalog.
//!
//! Three tools are served over stdio:
//! - `search` - find models by query, tags or categories
//! - `model-details` - metadata for one model
//! - `download` - save a model's asset to disk, with format fallback

pub mod schema;
pub mod server;
pub mod settings;
pub mod stdio;
pub mod telemetry;
pub mod tools;

pub use server::SketchfabServer;
pub use settings::{CliOverrides, ServerSettings};
pub use tools::{ToolContext, ToolReply};
