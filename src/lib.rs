pub mod config;
pub mod country;
pub mod error;
pub mod html;
pub mod models;
pub mod page;
pub mod prompt;
pub mod refine;
pub mod search;
pub mod server;
pub mod synth;
pub mod table;
pub mod transport;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::config::Config;
use crate::country::{CountryResolver, GroqCountryResolver};
use crate::error::Result;
use crate::models::SearchForm;
use crate::refine::{GroqRefiner, QueryRefiner};
use crate::search::{ProductSearch, SerpApiSearch};
use crate::synth::{GroqSummarizer, Summarizer};
use crate::table::ComparisonTable;
use crate::transport::{GroqTransport, Transport};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a search query.";
pub const NO_PRODUCTS_MESSAGE: &str = "No products found for your query.";
pub const SEARCH_FAILED_MESSAGE: &str = "Something went wrong while searching. Please try again.";

/// Result of one `/search` submission
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The query was blank; nothing was sent upstream
    EmptyQuery,
    NoProducts { refined_query: String },
    /// Refinement or search failed upstream
    Failed,
    Results {
        refined_query: String,
        comparison_table: String,
        summary: String,
    },
}

impl SearchOutcome {
    /// Message shown above the form, if any
    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            Self::EmptyQuery => Some(EMPTY_QUERY_MESSAGE),
            Self::NoProducts { .. } => Some(NO_PRODUCTS_MESSAGE),
            Self::Failed => Some(SEARCH_FAILED_MESSAGE),
            Self::Results { .. } => None,
        }
    }
}

pub struct ShoppingAssistant {
    refiner: Arc<dyn QueryRefiner>,
    search: Arc<dyn ProductSearch>,
    summarizer: Arc<dyn Summarizer>,
    default_location: String,
}

impl ShoppingAssistant {
    pub fn new(cfg: &Config) -> Result<Self> {
        let transport = Arc::new(GroqTransport::new(&cfg.groq, cfg.retry.clone())?);

        let refiner = GroqRefiner::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            cfg.groq.refine_model.clone(),
        );

        let countries = GroqCountryResolver::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            cfg.groq.refine_model.clone(),
        );
        let search = SerpApiSearch::new(cfg.serpapi.clone())?
            .with_country_resolver(Arc::new(countries) as Arc<dyn CountryResolver>);

        let summarizer = GroqSummarizer::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            cfg.groq.summary_model.clone(),
        );

        Ok(Self::from_parts(
            Arc::new(refiner),
            Arc::new(search),
            Arc::new(summarizer),
            cfg.server.default_location.clone(),
        ))
    }

    pub fn from_parts(
        refiner: Arc<dyn QueryRefiner>,
        search: Arc<dyn ProductSearch>,
        summarizer: Arc<dyn Summarizer>,
        default_location: String,
    ) -> Self {
        Self {
            refiner,
            search,
            summarizer,
            default_location,
        }
    }

    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    /// The form's location, falling back to the configured default when absent
    pub fn location_for(&self, form: &SearchForm) -> String {
        form.location
            .clone()
            .unwrap_or_else(|| self.default_location.clone())
    }

    /// Refine, search, then tabulate and summarize one submission
    pub async fn handle_search(&self, form: &SearchForm) -> SearchOutcome {
        let query = form.query.trim();
        if query.is_empty() {
            tracing::info!("Rejected empty query");
            return SearchOutcome::EmptyQuery;
        }
        let location = self.location_for(form);

        let refined = match self.refiner.refine(query).await {
            Ok(refined) => refined,
            Err(e) => {
                tracing::error!(error = %e, "Query refinement failed");
                return SearchOutcome::Failed;
            }
        };
        let refined_query = refined.search_text();

        let products = match self.search.search(&refined_query, &location).await {
            Ok(products) => products,
            Err(e) => {
                tracing::error!(error = %e, refined_query = %refined_query, "Product search failed");
                return SearchOutcome::Failed;
            }
        };

        if products.is_empty() {
            tracing::info!(refined_query = %refined_query, "No products found");
            return SearchOutcome::NoProducts { refined_query };
        }

        let table = ComparisonTable::from_products(&products);
        let (comparison_table, summary) = synth::compare(self.summarizer.as_ref(), &table).await;

        tracing::info!(
            refined_query = %refined_query,
            found = products.len(),
            shown = table.len(),
            "Search complete"
        );

        SearchOutcome::Results {
            refined_query,
            comparison_table,
            summary,
        }
    }
}
