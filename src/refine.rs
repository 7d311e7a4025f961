use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::error::{Result, ShoppingAssistantError};
use crate::models::RefinedQuery;
use crate::prompt::{Prompt, extract_json, json_format_instructions};
use crate::transport::{Transport, complete};

const REFINE_SYSTEM_PROMPT: &str =
    "You are a highly skilled shopping assistant. Refine user queries into specific product searches.";

pub struct GroqRefiner {
    tx: Arc<dyn Transport>,
    model: String,
    format_prompt: String,
}

impl GroqRefiner {
    pub fn new(tx: Arc<dyn Transport>, model: String) -> Self {
        let schema = json!({
            "properties": {
                "refined_query": {
                    "description": "Refined search query for the product search.",
                    "title": "Refined Query",
                    "type": "string"
                },
                "additional_info": {
                    "description": "Additional adjectives summarized to be added to the search query.",
                    "title": "Additional Info",
                    "type": "string"
                }
            },
            "required": ["refined_query", "additional_info"]
        });
        Self {
            tx,
            model,
            format_prompt: json_format_instructions(&schema),
        }
    }
}

#[async_trait]
pub trait QueryRefiner: Send + Sync {
    async fn refine(&self, query: &str) -> Result<RefinedQuery>;
}

#[async_trait]
impl QueryRefiner for GroqRefiner {
    async fn refine(&self, query: &str) -> Result<RefinedQuery> {
        tracing::info!("Refining shopping query with Groq: {}", query);

        let prompt = Prompt {
            system: REFINE_SYSTEM_PROMPT,
            format: &self.format_prompt,
            user: query,
        };

        // Keep temperature low for consistent JSON output
        let raw = complete(self.tx.as_ref(), &self.model, prompt.render(), 0.0, 512).await?;

        let value = extract_json(&raw)?;
        let refined: RefinedQuery = serde_json::from_value(value).map_err(|e| {
            ShoppingAssistantError::Internal(format!(
                "Failed to deserialize refined query JSON: {e}. Raw: {raw}"
            ))
        })?;

        if refined.refined_query.trim().is_empty() {
            return Err(ShoppingAssistantError::Internal(format!(
                "Groq returned an empty refined query. Raw: {raw}"
            )));
        }

        tracing::debug!(
            refined_query = %refined.refined_query,
            additional_info = %refined.additional_info,
            "Query refined"
        );
        Ok(refined)
    }
}
