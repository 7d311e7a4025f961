use async_trait::async_trait;
use std::sync::Arc;

use crate::prompt::Prompt;
use crate::transport::{Transport, complete};

const COUNTRY_SYSTEM_PROMPT: &str = "You are an expert at identifying ISO 3166-1 alpha-2 country codes from locations. \
Output only the two-letter country code (e.g., 'US' for United States) for the provided location, \
without any additional text or explanations.";
const COUNTRY_FORMAT_PROMPT: &str = "Output the ISO 3166-1 alpha-2 country code only.";

/// Maps a free-form location to the country code the search API expects as `gl`
#[async_trait]
pub trait CountryResolver: Send + Sync {
    /// `None` means "let the search API infer the country from the location"
    async fn country_code(&self, location: &str) -> Option<String>;
}

pub struct GroqCountryResolver {
    tx: Arc<dyn Transport>,
    model: String,
}

impl GroqCountryResolver {
    pub fn new(tx: Arc<dyn Transport>, model: String) -> Self {
        Self { tx, model }
    }
}

/// Accept only a bare two-letter code, uppercased
pub fn normalize_country_code(reply: &str) -> Option<String> {
    let code = reply.trim();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_ascii_uppercase())
    } else {
        None
    }
}

#[async_trait]
impl CountryResolver for GroqCountryResolver {
    async fn country_code(&self, location: &str) -> Option<String> {
        let user_prompt = format!("Location: {location}");
        let prompt = Prompt {
            system: COUNTRY_SYSTEM_PROMPT,
            format: COUNTRY_FORMAT_PROMPT,
            user: &user_prompt,
        };

        let reply = match complete(self.tx.as_ref(), &self.model, prompt.render(), 0.0, 8).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(location, error = %e, "Country code lookup failed");
                return None;
            }
        };

        match normalize_country_code(&reply) {
            Some(code) => {
                tracing::info!(location, gl = %code, "Resolved country code");
                Some(code)
            }
            None => {
                tracing::warn!(location, reply = %reply.trim(), "Invalid country code returned");
                None
            }
        }
    }
}
