use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::prompt::Prompt;
use crate::table::ComparisonTable;
use crate::transport::{Transport, complete};

/// Section headers every summary must carry, in display order
pub const REQUIRED_SECTIONS: [&str; 5] = [
    "<h3>Best Value Product</h3>",
    "<h3>Highest Rated Option</h3>",
    "<h3>Unique Features</h3>",
    "<h3>Trade-offs and Comparisons</h3>",
    "<h3>Conclusion and Suggestion</h3>",
];

pub const SUMMARY_UNAVAILABLE: &str = "<h3>Summary Unavailable</h3><p>An error occurred.</p>";
pub const NO_PRODUCT_SUMMARY: &str =
    "<h3>Summary Unavailable</h3><p>No product data available.</p>";
pub const NO_PRODUCT_TABLE: &str = "<h3>No Products Found</h3>";

const SECTION_PLACEHOLDER: &str = "<p>Data unavailable for this section.</p>";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a highly skilled shopping assistant with expertise in comparing products and summarizing findings.";
const SUMMARY_FORMAT_PROMPT: &str = "<h3>Best Value Product</h3>: Explain best value.\n\
<h3>Highest Rated Option</h3>: Highlight the top-rated product.\n\
<h3>Unique Features</h3>: List unique features.\n\
<h3>Trade-offs and Comparisons</h3>: Discuss trade-offs.\n\
<h3>Conclusion and Suggestion</h3>: Final recommendation.\n\
Use HTML with <ul> and <li> where needed.";

/// Append a placeholder block for every required section missing from `summary`
pub fn ensure_sections(mut summary: String) -> String {
    for section in REQUIRED_SECTIONS {
        if !summary.contains(section) {
            summary.push('\n');
            summary.push_str(section);
            summary.push('\n');
            summary.push_str(SECTION_PLACEHOLDER);
        }
    }
    summary
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, table: &ComparisonTable) -> Result<String>;
}

pub struct GroqSummarizer {
    tx: Arc<dyn Transport>,
    model: String,
}

impl GroqSummarizer {
    pub fn new(tx: Arc<dyn Transport>, model: String) -> Self {
        Self { tx, model }
    }
}

#[async_trait]
impl Summarizer for GroqSummarizer {
    async fn summarize(&self, table: &ComparisonTable) -> Result<String> {
        tracing::info!(rows = table.len(), "Summarizing comparison with Groq");

        let user_prompt = format!(
            "Here is the product information in JSON format:\n{}",
            table.prompt_json()?
        );
        let prompt = Prompt {
            system: SUMMARY_SYSTEM_PROMPT,
            format: SUMMARY_FORMAT_PROMPT,
            user: &user_prompt,
        };

        let raw = complete(self.tx.as_ref(), &self.model, prompt.render(), 0.3, 1500).await?;
        let preview: String = raw.chars().take(500).collect();
        tracing::debug!(%preview, "Summary response");

        Ok(ensure_sections(raw.trim().to_string()))
    }
}

/// Table HTML and summary for a result page; never fails
pub async fn compare(summarizer: &dyn Summarizer, table: &ComparisonTable) -> (String, String) {
    if table.is_empty() {
        return (
            NO_PRODUCT_TABLE.to_string(),
            ensure_sections(NO_PRODUCT_SUMMARY.to_string()),
        );
    }

    let summary = match summarizer.summarize(table).await {
        Ok(summary) => ensure_sections(summary),
        Err(e) => {
            tracing::error!(error = %e, "Error generating summary");
            ensure_sections(SUMMARY_UNAVAILABLE.to_string())
        }
    };

    (table.to_html(), summary)
}
