use thiserror::Error;

/// Everything that can go wrong talking to Sketchfab.
///
/// The `Display` text is what ends up in front of the agent, so it is
/// written as a sentence rather than a debug dump.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from any authenticated endpoint.
    #[error("Invalid Sketchfab API key")]
    InvalidApiKey,

    /// 429 from search.
    #[error("Sketchfab API rate limit exceeded. Please try again later.")]
    RateLimited,

    /// 404 from model lookup or download links.
    #[error("Model with ID {0} not found")]
    NotFound(String),

    /// 400 from download links.
    #[error("Model {0} is not downloadable")]
    NotDownloadable(String),

    /// 403 from download links.
    #[error("You don't have permission to download model {0}")]
    Forbidden(String),

    /// Any other non-2xx answer from the catalog API.
    #[error("Sketchfab API error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// Non-2xx from the pre-signed asset URL.
    #[error("Failed to download model file: HTTP {status}")]
    Download { status: u16 },

    /// No response at all (connect failure, timeout, TLS, ...).
    #[error("Request to Sketchfab failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx body that does not look like what the API documents.
    #[error("Unexpected response from Sketchfab: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot be used to build request URLs.
    #[error("Invalid Sketchfab API URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    /// HTTP status behind this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::InvalidApiKey => Some(401),
            ApiError::RateLimited => Some(429),
            ApiError::NotFound(_) => Some(404),
            ApiError::NotDownloadable(_) => Some(400),
            ApiError::Forbidden(_) => Some(403),
            ApiError::Remote { status, .. } | ApiError::Download { status } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) | ApiError::InvalidBaseUrl { .. } => None,
        }
    }
}
