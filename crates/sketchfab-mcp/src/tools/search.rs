use sketchfab_api::{SearchPage, SearchQuery, MAX_SEARCH_LIMIT};
use tracing::warn;

use super::{display_name, yes_no, ToolContext, ToolReply, MISSING_API_KEY};

pub const MISSING_CRITERIA: &str =
    "Please provide at least one search parameter: query, tags, or categories.";

pub const NO_RESULTS: &str =
    "No models found matching your search criteria. Try broadening your search terms.";

impl ToolContext {
    /// Keyword/tag/category search over the catalog.
    #[tracing::instrument(
        name = "tool.search",
        skip(self, query),
        fields(search.query = query.text().unwrap_or_default())
    )]
    pub async fn search(&self, query: SearchQuery) -> ToolReply {
        let Some(client) = self.client() else {
            return ToolReply::ok(MISSING_API_KEY);
        };

        if !query.has_criteria() {
            return ToolReply::ok(MISSING_CRITERIA);
        }

        match client.search(&query).await {
            Ok(page) if page.results.is_empty() => ToolReply::ok(NO_RESULTS),
            Ok(page) => ToolReply::ok(format_results(&page)),
            Err(e) => {
                warn!(error = %e, "Search failed");
                ToolReply::error(format!("Error searching Sketchfab: {}", e))
            }
        }
    }
}

fn format_results(page: &SearchPage) -> String {
    let entries: Vec<String> = page
        .results
        .iter()
        .enumerate()
        .map(|(i, model)| {
            format!(
                "{}. {}\n   ID: {}\n   Downloadable: {}",
                i + 1,
                display_name(model),
                model.uid,
                yes_no(model.is_downloadable)
            )
        })
        .collect();

    let mut text = format!("Found {} models:\n\n{}", entries.len(), entries.join("\n\n"));

    if page.has_more() {
        text.push_str(&format!(
            "\n\nMore results are available. Refine the query or raise the limit (up to {}) to see others.",
            MAX_SEARCH_LIMIT
        ));
    }

    text
}
