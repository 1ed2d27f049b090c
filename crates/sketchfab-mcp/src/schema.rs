//! Tool argument types. The JSON schemas advertised in `tools/list` are
//! generated from these.

use std::path::PathBuf;

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use sketchfab_api::{ModelFormat, SearchQuery};

use crate::tools::DownloadOptions;

/// Arguments for `search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[schemars(description = "Free-text search query (e.g. 'medieval sword')")]
    #[serde(default)]
    pub query: Option<String>,

    #[schemars(description = "Tags to filter by (e.g. ['lowpoly', 'pbr'])")]
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "Category slugs to filter by (e.g. ['architecture'])")]
    #[serde(default)]
    pub categories: Option<Vec<String>>,

    #[schemars(description = "Only return models that can be downloaded")]
    #[serde(default)]
    pub downloadable: Option<bool>,

    #[schemars(
        description = "Maximum number of results (1-24, default 10)",
        range(min = 1, max = 24)
    )]
    #[serde(default)]
    pub limit: Option<u32>,
}

impl From<SearchRequest> for SearchQuery {
    fn from(request: SearchRequest) -> Self {
        SearchQuery {
            query: request.query,
            tags: request.tags.unwrap_or_default(),
            categories: request.categories.unwrap_or_default(),
            downloadable: request.downloadable,
            limit: request.limit,
        }
    }
}

/// Arguments for `model-details`.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelDetailsRequest {
    #[schemars(description = "Sketchfab model UID (the ID shown in search results)")]
    pub model_id: String,
}

/// Arguments for `download`.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    #[schemars(description = "Sketchfab model UID to download")]
    pub model_id: String,

    #[schemars(
        description = "Preferred format: gltf, glb, usdz or source. Defaults to the server's configured format (gltf). If unavailable, the first available of gltf, glb, usdz, source is used instead."
    )]
    #[serde(default)]
    pub format: Option<ModelFormat>,

    #[schemars(
        description = "Where to save the file. Defaults to <name>_<id>.<format> in the download directory. Existing files are overwritten; the parent directory must exist."
    )]
    #[serde(default)]
    pub output_path: Option<String>,
}

impl From<DownloadRequest> for DownloadOptions {
    fn from(request: DownloadRequest) -> Self {
        DownloadOptions {
            model_id: request.model_id,
            format: request.format,
            output_path: request
                .output_path
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}
