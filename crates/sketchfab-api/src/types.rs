//! Catalog data model.
//!
//! Only the fields the tools render are typed; everything else in the
//! Sketchfab payloads is ignored. Optional fields tolerate both absence
//! and explicit `null`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default page size when the caller does not ask for one.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Largest page size the search endpoint accepts.
pub const MAX_SEARCH_LIMIT: u32 = 24;

// =============================================================================
// Credential
// =============================================================================

/// A Sketchfab API token.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a token. Blank input yields `None`.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Value for the `Authorization` header.
    pub(crate) fn header_value(&self) -> String {
        format!("Token {}", self.0)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

// =============================================================================
// Formats
// =============================================================================

/// Asset formats offered by the download endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    #[default]
    Gltf,
    Glb,
    Usdz,
    Source,
}

impl ModelFormat {
    /// Every format, in fallback preference order.
    pub const ALL: [ModelFormat; 4] = [
        ModelFormat::Gltf,
        ModelFormat::Glb,
        ModelFormat::Usdz,
        ModelFormat::Source,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelFormat::Gltf => "gltf",
            ModelFormat::Glb => "glb",
            ModelFormat::Usdz => "usdz",
            ModelFormat::Source => "source",
        }
    }

    /// File extension used for saved assets.
    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        ModelFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == lowered)
            .ok_or_else(|| {
                format!(
                    "Unknown model format '{}'. Use one of: gltf, glb, usdz, source",
                    s
                )
            })
    }
}

// =============================================================================
// Search
// =============================================================================

/// Search parameters as the tool receives them.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub downloadable: Option<bool>,
    pub limit: Option<u32>,
}

impl SearchQuery {
    /// Free-text query with surrounding whitespace removed, if any is left.
    pub fn text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// True when at least one of query, tags or categories is non-blank.
    pub fn has_criteria(&self) -> bool {
        self.text().is_some()
            || non_blank(&self.tags).next().is_some()
            || non_blank(&self.categories).next().is_some()
    }

    /// Page size actually sent upstream.
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT)
    }

    /// Query string pairs for `GET /search`.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("type", "models".to_string())];

        if let Some(q) = self.text() {
            pairs.push(("q", q.to_string()));
        }
        for tag in non_blank(&self.tags) {
            pairs.push(("tags", tag.to_string()));
        }
        for category in non_blank(&self.categories) {
            pairs.push(("categories", category.to_string()));
        }
        if let Some(downloadable) = self.downloadable {
            pairs.push(("downloadable", downloadable.to_string()));
        }
        pairs.push(("count", self.effective_limit().to_string()));

        pairs
    }
}

fn non_blank(values: &[String]) -> impl Iterator<Item = &str> {
    values.iter().map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// One page of search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<ModelSummary>,

    /// URL of the next page.
    #[serde(default)]
    pub next: Option<String>,

    /// URL of the previous page.
    #[serde(default)]
    pub previous: Option<String>,

    #[serde(default)]
    pub cursors: Option<Cursors>,
}

impl SearchPage {
    pub fn has_more(&self) -> bool {
        self.next.is_some()
            || self
                .cursors
                .as_ref()
                .and_then(|c| c.next.as_ref())
                .is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

// =============================================================================
// Models
// =============================================================================

/// A catalog entry: metadata only, never geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub uid: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub user: Option<Creator>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_downloadable: bool,

    #[serde(default)]
    pub view_count: Option<u64>,

    #[serde(default)]
    pub like_count: Option<u64>,

    #[serde(default)]
    pub download_count: Option<u64>,

    #[serde(default)]
    pub license: Option<License>,

    #[serde(default)]
    pub thumbnails: Option<Thumbnails>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Label>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Label>,
}

impl ModelSummary {
    /// Creator username, when the API sent one.
    pub fn creator_username(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.username.as_deref())
            .filter(|u| !u.is_empty())
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnails.as_ref().and_then(Thumbnails::best_url)
    }

    pub fn license_label(&self) -> Option<&str> {
        self.license.as_ref().and_then(License::label)
    }

    /// Description, unless it is blank.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
}

/// Sketchfab sends licenses either as a bare string or as an object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum License {
    Text(String),
    Detail {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        slug: Option<String>,
    },
    Other(serde_json::Value),
}

impl License {
    pub fn label(&self) -> Option<&str> {
        let label = match self {
            License::Text(text) => Some(text.as_str()),
            License::Detail { label, slug } => label.as_deref().or(slug.as_deref()),
            License::Other(_) => None,
        };
        label.filter(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
}

impl Thumbnails {
    /// URL of the widest image; the first one wins ties.
    pub fn best_url(&self) -> Option<&str> {
        let mut best: Option<&Image> = None;
        for image in self.images.iter().filter(|i| !i.url.is_empty()) {
            let wider = best.map_or(true, |current| {
                image.width.unwrap_or(0) > current.width.unwrap_or(0)
            });
            if wider {
                best = Some(image);
            }
        }
        best.map(|i| i.url.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// A tag or category reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl Label {
    pub fn display(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.slug.as_deref())
            .filter(|s| !s.is_empty())
    }
}

// =============================================================================
// Downloads
// =============================================================================

/// Signed, short-lived URLs per format from `GET /models/{uid}/download`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadLinks {
    #[serde(default)]
    pub gltf: Option<DownloadLink>,
    #[serde(default)]
    pub glb: Option<DownloadLink>,
    #[serde(default)]
    pub usdz: Option<DownloadLink>,
    #[serde(default)]
    pub source: Option<DownloadLink>,
}

impl DownloadLinks {
    /// The link for `format`, ignoring entries without a URL.
    pub fn get(&self, format: ModelFormat) -> Option<&DownloadLink> {
        let link = match format {
            ModelFormat::Gltf => self.gltf.as_ref(),
            ModelFormat::Glb => self.glb.as_ref(),
            ModelFormat::Usdz => self.usdz.as_ref(),
            ModelFormat::Source => self.source.as_ref(),
        };
        link.filter(|l| !l.url.is_empty())
    }

    /// First usable format in [`ModelFormat::ALL`] order.
    pub fn first_available(&self) -> Option<(ModelFormat, &DownloadLink)> {
        ModelFormat::ALL
            .into_iter()
            .find_map(|format| self.get(format).map(|link| (format, link)))
    }

    pub fn available(&self) -> Vec<ModelFormat> {
        ModelFormat::ALL
            .into_iter()
            .filter(|format| self.get(*format).is_some())
            .collect()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DownloadLink {
    #[serde(default)]
    pub url: String,
    /// Archive size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Seconds until the URL stops working.
    #[serde(default)]
    pub expires: Option<u64>,
}

// Signed URLs are credentials in their own right.
impl fmt::Debug for DownloadLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadLink")
            .field("url", &"<signed>")
            .field("size", &self.size)
            .field("expires", &self.expires)
            .finish()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_parse_and_display() {
        assert_eq!("GLB".parse::<ModelFormat>().unwrap(), ModelFormat::Glb);
        assert_eq!(ModelFormat::Usdz.to_string(), "usdz");
        assert!("obj".parse::<ModelFormat>().is_err());
        assert_eq!(ModelFormat::default(), ModelFormat::Gltf);
    }

    #[test]
    fn test_format_serde_is_lowercase() {
        let f: ModelFormat = serde_json::from_value(json!("source")).unwrap();
        assert_eq!(f, ModelFormat::Source);
        assert_eq!(serde_json::to_value(ModelFormat::Glb).unwrap(), json!("glb"));
    }

    #[test]
    fn test_api_key_rejects_blank_and_redacts() {
        assert!(ApiKey::new("   ").is_none());
        let key = ApiKey::new(" abc123 ").unwrap();
        assert_eq!(key.header_value(), "Token abc123");
        assert!(!format!("{:?}", key).contains("abc123"));
    }

    #[test]
    fn test_limit_defaults_and_clamps() {
        let mut q = SearchQuery::default();
        assert_eq!(q.effective_limit(), 10);
        q.limit = Some(100);
        assert_eq!(q.effective_limit(), 24);
        q.limit = Some(0);
        assert_eq!(q.effective_limit(), 1);
        q.limit = Some(24);
        assert_eq!(q.effective_limit(), 24);
    }

    #[test]
    fn test_blank_criteria_do_not_count() {
        let q = SearchQuery {
            query: Some("  ".into()),
            tags: vec!["".into(), " ".into()],
            ..Default::default()
        };
        assert!(!q.has_criteria());

        let q = SearchQuery {
            categories: vec!["vehicles".into()],
            ..Default::default()
        };
        assert!(q.has_criteria());
    }

    #[test]
    fn test_query_pairs() {
        let q = SearchQuery {
            query: Some(" chair ".into()),
            tags: vec!["wood".into(), "".into(), "lowpoly".into()],
            categories: vec![],
            downloadable: Some(true),
            limit: Some(50),
        };
        let pairs = q.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("type", "models".to_string()),
                ("q", "chair".to_string()),
                ("tags", "wood".to_string()),
                ("tags", "lowpoly".to_string()),
                ("downloadable", "true".to_string()),
                ("count", "24".to_string()),
            ]
        );
    }

    #[test]
    fn test_model_tolerates_nulls_and_missing_fields() {
        let model: ModelSummary = serde_json::from_value(json!({
            "uid": "abc",
            "name": "Chair",
            "description": null,
            "user": null,
            "isDownloadable": null,
            "tags": null,
            "license": null,
            "someFieldWeIgnore": 3
        }))
        .unwrap();

        assert_eq!(model.uid, "abc");
        assert!(!model.is_downloadable);
        assert!(model.tags.is_empty());
        assert!(model.creator_username().is_none());
        assert!(model.thumbnail_url().is_none());
        assert!(model.description_text().is_none());
    }

    #[test]
    fn test_license_shapes() {
        let text: License = serde_json::from_value(json!("CC Attribution")).unwrap();
        assert_eq!(text.label(), Some("CC Attribution"));

        let detail: License =
            serde_json::from_value(json!({"uid": "x", "label": "CC0", "slug": "cc0"})).unwrap();
        assert_eq!(detail.label(), Some("CC0"));

        let other: License = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(other.label(), None);
    }

    #[test]
    fn test_thumbnail_picks_widest() {
        let thumbs: Thumbnails = serde_json::from_value(json!({
            "images": [
                {"url": "https://img/small.jpg", "width": 100},
                {"url": "https://img/big.jpg", "width": 1024},
                {"url": "https://img/big2.jpg", "width": 1024},
                {"url": "", "width": 4096}
            ]
        }))
        .unwrap();
        assert_eq!(thumbs.best_url(), Some("https://img/big.jpg"));
    }

    #[test]
    fn test_thumbnail_without_widths_uses_first() {
        let thumbs: Thumbnails = serde_json::from_value(json!({
            "images": [{"url": "https://img/a.jpg"}, {"url": "https://img/b.jpg"}]
        }))
        .unwrap();
        assert_eq!(thumbs.best_url(), Some("https://img/a.jpg"));
    }

    #[test]
    fn test_download_links_fallback_order() {
        let links: DownloadLinks = serde_json::from_value(json!({
            "usdz": {"url": "https://cdn/u.usdz", "size": 10, "expires": 300},
            "source": {"url": "https://cdn/s.zip"},
            "gltf": null
        }))
        .unwrap();

        assert!(links.get(ModelFormat::Gltf).is_none());
        let (format, link) = links.first_available().unwrap();
        assert_eq!(format, ModelFormat::Usdz);
        assert_eq!(link.url, "https://cdn/u.usdz");
        assert_eq!(
            links.available(),
            vec![ModelFormat::Usdz, ModelFormat::Source]
        );
    }

    #[test]
    fn test_download_links_empty_url_is_absent() {
        let links: DownloadLinks =
            serde_json::from_value(json!({"glb": {"url": ""}})).unwrap();
        assert!(links.first_available().is_none());
        assert!(links.available().is_empty());
    }

    #[test]
    fn test_download_link_debug_hides_url() {
        let link = DownloadLink {
            url: "https://cdn/secret?sig=abc".into(),
            size: Some(1),
            expires: None,
        };
        assert!(!format!("{:?}", link).contains("sig=abc"));
    }

    #[test]
    fn test_search_page_has_more() {
        let page: SearchPage = serde_json::from_value(json!({
            "results": [],
            "next": null,
            "cursors": {"next": "24", "previous": null}
        }))
        .unwrap();
        assert!(page.has_more());

        let page: SearchPage = serde_json::from_value(json!({"results": []})).unwrap();
        assert!(!page.has_more());
    }
}
