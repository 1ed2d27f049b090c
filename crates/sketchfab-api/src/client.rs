//! HTTP client for the Sketchfab v3 API.

use crate::error::ApiError;
use crate::types::{ApiKey, DownloadLinks, ModelSummary, SearchPage, SearchQuery};
use bytes::Bytes;
use reqwest::{header, Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on TCP/TLS connect, whatever the request timeout is.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How much of an unparseable error body makes it into messages.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Endpoint and timeouts for [`SketchfabClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Applies to search, model and download-link calls.
    pub api_timeout: Duration,
    /// Applies to fetching asset bytes from a signed URL.
    pub download_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from(&sketchconf::SketchConfig::default())
    }
}

impl From<&sketchconf::SketchConfig> for ClientConfig {
    fn from(config: &sketchconf::SketchConfig) -> Self {
        Self {
            base_url: config.api.base_url.clone(),
            api_timeout: Duration::from_secs(config.api.timeout_secs),
            download_timeout: Duration::from_secs(config.download.timeout_secs),
        }
    }
}

/// Which call a status code came back from; the same code means
/// different things on different endpoints.
#[derive(Debug, Clone, Copy)]
enum Endpoint<'a> {
    Search,
    Model(&'a str),
    DownloadLinks(&'a str),
}

/// Authenticated Sketchfab client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SketchfabClient {
    http: Client,
    base_url: Url,
    api_key: ApiKey,
    download_timeout: Duration,
}

impl SketchfabClient {
    pub fn new(api_key: ApiKey, config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = parse_base_url(&config.base_url)?;

        let http = Client::builder()
            .user_agent(concat!("sketchfab-mcp/", env!("CARGO_PKG_VERSION")))
            .timeout(config.api_timeout)
            .connect_timeout(config.api_timeout.min(CONNECT_TIMEOUT))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key,
            download_timeout: config.download_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /search?type=models&...`
    #[tracing::instrument(
        name = "sketchfab.search",
        skip(self, query),
        fields(
            search.limit = query.effective_limit(),
            search.results = tracing::field::Empty,
        )
    )]
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ApiError> {
        let url = self.endpoint(&["search"])?;

        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, self.api_key.header_value())
            .query(&query.to_query_pairs())
            .send()
            .await?;

        let response = check_status(response, Endpoint::Search).await?;
        let page: SearchPage = decode(response).await?;

        tracing::Span::current().record("search.results", page.results.len());
        Ok(page)
    }

    /// `GET /models/{uid}`
    #[tracing::instrument(name = "sketchfab.model", skip(self))]
    pub async fn model(&self, uid: &str) -> Result<ModelSummary, ApiError> {
        let url = self.endpoint(&["models", uid])?;

        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, self.api_key.header_value())
            .send()
            .await?;

        let response = check_status(response, Endpoint::Model(uid)).await?;
        decode(response).await
    }

    /// `GET /models/{uid}/download`
    #[tracing::instrument(
        name = "sketchfab.download_links",
        skip(self),
        fields(download.formats = tracing::field::Empty)
    )]
    pub async fn download_links(&self, uid: &str) -> Result<DownloadLinks, ApiError> {
        let url = self.endpoint(&["models", uid, "download"])?;

        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, self.api_key.header_value())
            .send()
            .await?;

        let response = check_status(response, Endpoint::DownloadLinks(uid)).await?;
        let links: DownloadLinks = decode(response).await?;

        tracing::Span::current().record(
            "download.formats",
            tracing::field::debug(links.available()),
        );
        Ok(links)
    }

    /// Fetch asset bytes from a pre-signed URL.
    ///
    /// The URL carries its own signature, so no Authorization header is
    /// sent. Errors are stripped of the URL to keep signatures out of logs.
    #[tracing::instrument(
        name = "sketchfab.download_bytes",
        skip(self, url),
        fields(download.bytes = tracing::field::Empty)
    )]
    pub async fn download_bytes(&self, url: &str) -> Result<Bytes, ApiError> {
        let response = self
            .http
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Asset download failed");
            return Err(ApiError::Download {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.without_url()))?;

        tracing::Span::current().record("download.bytes", bytes.len());
        debug!(bytes = bytes.len(), "Asset downloaded");
        Ok(bytes)
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }

    Ok(url)
}

async fn check_status(response: Response, endpoint: Endpoint<'_>) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = map_status(endpoint, status, &body);
    warn!(status = status.as_u16(), ?endpoint, error = %err, "Sketchfab API call failed");
    Err(err)
}

fn map_status(endpoint: Endpoint<'_>, status: StatusCode, body: &str) -> ApiError {
    match (status, endpoint) {
        (StatusCode::UNAUTHORIZED, _) => ApiError::InvalidApiKey,
        (StatusCode::TOO_MANY_REQUESTS, Endpoint::Search) => ApiError::RateLimited,
        (StatusCode::NOT_FOUND, Endpoint::Model(uid) | Endpoint::DownloadLinks(uid)) => {
            ApiError::NotFound(uid.to_string())
        }
        (StatusCode::BAD_REQUEST, Endpoint::DownloadLinks(uid)) => {
            ApiError::NotDownloadable(uid.to_string())
        }
        (StatusCode::FORBIDDEN, Endpoint::DownloadLinks(uid)) => {
            ApiError::Forbidden(uid.to_string())
        }
        _ => ApiError::Remote {
            status: status.as_u16(),
            message: error_message(status, body),
        },
    }
}

/// Best human-readable message from an error body.
///
/// Sketchfab usually answers `{"detail": "..."}`; anything else is passed
/// through, shortened.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(text) = json.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string();
    }

    if trimmed.chars().count() > MAX_ERROR_BODY_CHARS {
        let short: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}…", short)
    } else {
        trimmed.to_string()
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
