use sketchfab_api::ModelSummary;
use tracing::warn;

use super::{display_name, yes_no, ToolContext, ToolReply, MISSING_API_KEY};

impl ToolContext {
    /// Metadata block for one model.
    #[tracing::instrument(name = "tool.model_details", skip(self))]
    pub async fn model_details(&self, model_id: &str) -> ToolReply {
        let Some(client) = self.client() else {
            return ToolReply::ok(MISSING_API_KEY);
        };

        let uid = model_id.trim();
        if uid.is_empty() {
            return ToolReply::error("Error getting model details: modelId must not be empty");
        }

        match client.model(uid).await {
            Ok(model) => ToolReply::ok(format_details(&model)),
            Err(e) => {
                warn!(error = %e, "Model lookup failed");
                ToolReply::error(format!("Error getting model details: {}", e))
            }
        }
    }
}

fn format_details(model: &ModelSummary) -> String {
    let mut lines = vec![
        format!("Model: {}", display_name(model)),
        format!("ID: {}", model.uid),
        format!("Creator: {}", model.creator_username().unwrap_or("Unknown")),
        format!("Downloadable: {}", yes_no(model.is_downloadable)),
        format!(
            "Thumbnail: {}",
            model.thumbnail_url().unwrap_or("No thumbnail")
        ),
    ];

    if let Some(license) = model.license_label() {
        lines.push(format!("License: {}", license));
    }

    let stats: Vec<String> = [
        (model.view_count, "views"),
        (model.like_count, "likes"),
        (model.download_count, "downloads"),
    ]
    .into_iter()
    .filter_map(|(count, label)| count.map(|n| format!("{} {}", n, label)))
    .collect();
    if !stats.is_empty() {
        lines.push(format!("Stats: {}", stats.join(", ")));
    }

    let tags: Vec<&str> = model.tags.iter().filter_map(|t| t.display()).collect();
    if !tags.is_empty() {
        lines.push(format!("Tags: {}", tags.join(", ")));
    }

    let categories: Vec<&str> = model
        .categories
        .iter()
        .filter_map(|c| c.display())
        .collect();
    if !categories.is_empty() {
        lines.push(format!("Categories: {}", categories.join(", ")));
    }

    if let Some(description) = model.description_text() {
        lines.push(format!("Description: {}", description));
    }

    lines.join("\n")
}
