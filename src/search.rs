use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::SerpApiConfig;
use crate::country::CountryResolver;
use crate::error::{Result, ShoppingAssistantError};
use crate::models::Product;

/// SerpApi reports an empty result page as an error string
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

#[async_trait]
pub trait ProductSearch: Send + Sync {
    async fn search(&self, query: &str, location: &str) -> Result<Vec<Product>>;
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    shopping_results: Vec<Product>,
    #[serde(default)]
    error: Option<String>,
}

pub struct SerpApiSearch {
    client: Client,
    cfg: SerpApiConfig,
    countries: Option<Arc<dyn CountryResolver>>,
}

impl SerpApiSearch {
    pub fn new(cfg: SerpApiConfig) -> Result<Self> {
        let client = Client::builder().timeout(cfg.timeout()).build()?;
        Ok(Self {
            client,
            cfg,
            countries: None,
        })
    }

    /// Resolve `gl` for every search through `resolver`
    pub fn with_country_resolver(mut self, resolver: Arc<dyn CountryResolver>) -> Self {
        self.countries = Some(resolver);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/search.json", self.cfg.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ProductSearch for SerpApiSearch {
    async fn search(&self, query: &str, location: &str) -> Result<Vec<Product>> {
        if query.trim().is_empty() {
            return Err(ShoppingAssistantError::Validation(
                "search query cannot be empty".to_string(),
            ));
        }

        let gl = match &self.countries {
            Some(resolver) if !location.trim().is_empty() => resolver.country_code(location).await,
            _ => None,
        };

        tracing::info!(query, location, gl = ?gl, "search: querying SerpApi");

        let mut params: Vec<(&str, &str)> = vec![
            ("engine", self.cfg.engine.as_str()),
            ("q", query),
            ("hl", self.cfg.language.as_str()),
            ("api_key", self.cfg.api_key.as_str()),
        ];
        if !location.trim().is_empty() {
            params.push(("location", location));
        }
        if let Some(gl) = gl.as_deref() {
            params.push(("gl", gl));
        }

        let response = self.client.get(self.endpoint()).query(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Error payloads are JSON too, so parse before looking at the status
        let parsed = serde_json::from_str::<SerpApiResponse>(&body);

        match parsed {
            Ok(data) => {
                if let Some(error) = data.error {
                    if error.contains(NO_RESULTS_MARKER) {
                        tracing::info!(query, "search: no results");
                        return Ok(Vec::new());
                    }
                    return Err(ShoppingAssistantError::upstream("SerpApi", error));
                }
                if !status.is_success() {
                    return Err(ShoppingAssistantError::upstream(
                        "SerpApi",
                        format!("HTTP {status}"),
                    ));
                }
                tracing::info!(query, count = data.shopping_results.len(), "search: complete");
                Ok(data.shopping_results)
            }
            Err(e) if status.is_success() => Err(ShoppingAssistantError::upstream(
                "SerpApi",
                format!("failed to parse response: {e}"),
            )),
            Err(_) => Err(ShoppingAssistantError::upstream(
                "SerpApi",
                format!("HTTP {status}: {body}"),
            )),
        }
    }
}
