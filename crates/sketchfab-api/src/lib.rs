//! Sketchfab v3 API client.
//!
//! Three calls against the catalog (search, model lookup, download links)
//! plus a raw fetch of pre-signed asset URLs. Rendering results for humans
//! is left to callers.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientConfig, SketchfabClient};
pub use error::ApiError;
pub use types::{
    ApiKey, Creator, DownloadLink, DownloadLinks, License, ModelFormat, ModelSummary, SearchPage,
    SearchQuery, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT,
};
