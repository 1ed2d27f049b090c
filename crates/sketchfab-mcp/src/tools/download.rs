use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sketchfab_api::{DownloadLink, DownloadLinks, ModelFormat, SketchfabClient};
use tracing::{info, warn};

use super::{display_name, ToolContext, ToolReply, MISSING_API_KEY};

/// A download request after argument parsing.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub model_id: String,
    /// `None` means the configured default.
    pub format: Option<ModelFormat>,
    /// Used verbatim when set.
    pub output_path: Option<PathBuf>,
}

/// The format that will actually be fetched.
#[derive(Debug)]
struct FormatChoice<'a> {
    format: ModelFormat,
    link: &'a DownloadLink,
    fallback: bool,
}

impl ToolContext {
    /// Fetch a model's asset and write it to disk.
    ///
    /// Existing files at the destination are overwritten without warning.
    #[tracing::instrument(
        name = "tool.download",
        skip(self, options),
        fields(model.uid = %options.model_id)
    )]
    pub async fn download(&self, options: DownloadOptions) -> ToolReply {
        let Some(client) = self.client() else {
            return ToolReply::ok(MISSING_API_KEY);
        };

        match self.try_download(client, options).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Download failed");
                ToolReply::error(format!("Error downloading model: {:#}", e))
            }
        }
    }

    async fn try_download(
        &self,
        client: &SketchfabClient,
        options: DownloadOptions,
    ) -> Result<ToolReply> {
        let uid = options.model_id.trim();
        if uid.is_empty() {
            anyhow::bail!("modelId must not be empty");
        }
        let requested = options.format.unwrap_or(self.default_format);

        let model = client.model(uid).await?;
        let name = display_name(&model);

        if !model.is_downloadable {
            return Ok(ToolReply::ok(format!(
                "Model '{}' ({}) is not downloadable. The creator has not enabled downloads for it.",
                name, uid
            )));
        }

        let links = client.download_links(uid).await?;
        let Some(choice) = choose_format(&links, requested) else {
            return Ok(ToolReply::ok(format!(
                "No download formats available for model '{}' ({}).",
                name, uid
            )));
        };

        if choice.fallback {
            info!(
                requested = %requested,
                using = %choice.format,
                "Requested format unavailable, falling back"
            );
        }

        let bytes = client.download_bytes(&choice.link.url).await?;

        let destination = options
            .output_path
            .unwrap_or_else(|| {
                destination_path(&self.download_dir, &model.name, &model.uid, choice.format)
            });

        tokio::fs::write(&destination, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", destination.display()))?;

        info!(
            path = %destination.display(),
            bytes = bytes.len(),
            format = %choice.format,
            "Model saved"
        );

        let mut text = format!(
            "Downloaded model '{}' ({})\nFormat: {}\nSaved to: {}\nSize: {} bytes",
            name,
            uid,
            choice.format,
            destination.display(),
            bytes.len()
        );
        if choice.fallback {
            text.push_str(&format!(
                "\nNote: {} format was not available, so {} was downloaded instead.",
                requested, choice.format
            ));
        }

        Ok(ToolReply::ok(text))
    }
}

/// The requested format if offered, else the first offered one in
/// [`ModelFormat::ALL`] order.
fn choose_format(links: &DownloadLinks, requested: ModelFormat) -> Option<FormatChoice<'_>> {
    if let Some(link) = links.get(requested) {
        return Some(FormatChoice {
            format: requested,
            link,
            fallback: false,
        });
    }

    links
        .first_available()
        .map(|(format, link)| FormatChoice {
            format,
            link,
            fallback: true,
        })
}

/// Replace every character outside `[A-Za-z0-9]` with `_`, one for one.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Default destination: `<dir>/<sanitized name>_<uid>.<format>`.
pub fn destination_path(dir: &Path, name: &str, uid: &str, format: ModelFormat) -> PathBuf {
    dir.join(format!(
        "{}_{}.{}",
        sanitize_name(name),
        uid,
        format.extension()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn links(value: serde_json::Value) -> DownloadLinks {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sanitize_is_one_for_one() {
        assert_eq!(sanitize_name("My Model #1!"), "My_Model__1_");
        assert_eq!(sanitize_name("café"), "caf_");
        assert_eq!(sanitize_name("../etc/passwd"), "___etc_passwd");
    }

    #[test]
    fn test_destination_in_temp_dir() {
        let path = destination_path(
            &std::env::temp_dir(),
            "My Model #1!",
            "abc123",
            ModelFormat::Glb,
        );
        assert_eq!(path.parent(), Some(std::env::temp_dir().as_path()));
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("My_Model__1__abc123.glb")
        );
    }

    #[test]
    fn test_destination_for_blank_names() {
        let path = destination_path(Path::new("/srv"), " ", "abc123", ModelFormat::Source);
        assert_eq!(path, PathBuf::from("/srv/__abc123.source"));

        let path = destination_path(Path::new("/srv"), "   ", "abc123", ModelFormat::Glb);
        assert_eq!(path, PathBuf::from("/srv/____abc123.glb"));

        let path = destination_path(Path::new("/srv"), "", "abc123", ModelFormat::Source);
        assert_eq!(path, PathBuf::from("/srv/_abc123.source"));
    }

    #[test]
    fn test_requested_format_wins() {
        let links = links(json!({
            "gltf": {"url": "https://cdn/a.zip"},
            "usdz": {"url": "https://cdn/a.usdz"}
        }));
        let choice = choose_format(&links, ModelFormat::Usdz).unwrap();
        assert_eq!(choice.format, ModelFormat::Usdz);
        assert!(!choice.fallback);
    }

    #[test]
    fn test_fallback_follows_preference_order() {
        let links = links(json!({
            "source": {"url": "https://cdn/a.zip"},
            "glb": {"url": "https://cdn/a.glb"}
        }));
        let choice = choose_format(&links, ModelFormat::Gltf).unwrap();
        assert_eq!(choice.format, ModelFormat::Glb);
        assert!(choice.fallback);
        assert_eq!(choice.link.url, "https://cdn/a.glb");
    }

    #[test]
    fn test_no_formats() {
        assert!(choose_format(&links(json!({})), ModelFormat::Gltf).is_none());
    }
}
