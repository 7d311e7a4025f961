use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, ShoppingAssistantError};

const PLACEHOLDER_GROQ_API_KEY: &str = "PLACEHOLDER_GROQ_API_KEY";
const PLACEHOLDER_SERPAPI_API_KEY: &str = "PLACEHOLDER_SERPAPI_API_KEY";

/// Main configuration structure for the shopping assistant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub groq: GroqConfig,
    pub serpapi: SerpApiConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    /// host:port the form is served on
    pub bind: String,
    /// Location used when the form omits one
    pub default_location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroqConfig {
    pub api_key: String,
    pub base_url: String,
    /// Model for query refinement and country lookup
    pub refine_model: String,
    /// Model for the comparison summary
    pub summary_model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub engine: String,
    /// Interface language passed as `hl`
    pub language: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_elapsed_seconds: u64,
    pub jitter_factor: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "shopping-assistant".to_string(),
            bind: "127.0.0.1:5000".to_string(),
            default_location: "United States".to_string(),
        }
    }
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: PLACEHOLDER_GROQ_API_KEY.to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            refine_model: "llama3-70b-8192".to_string(),
            summary_model: "llama3-70b-8192".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl Default for SerpApiConfig {
    fn default() -> Self {
        Self {
            api_key: PLACEHOLDER_SERPAPI_API_KEY.to_string(),
            base_url: "https://serpapi.com".to_string(),
            engine: "google_shopping".to_string(),
            language: "en".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 200,
            max_delay_ms: 30_000,
            max_elapsed_seconds: 300,
            jitter_factor: 0.2,
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        let env_paths = [".env", "../.env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::warn!(
                "No .env file found in any expected location - continuing with env vars only"
            );
        }

        let config_path = env::var("SA_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match Self::from_yaml(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok());

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| ShoppingAssistantError::Config(format!("invalid YAML: {e}")))
    }

    /// Apply overrides from a key lookup (the process environment in production)
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(name) = lookup("SA_SERVER_NAME") {
            self.server.name = name;
        }
        if let Some(bind) = lookup("SA_HTTP_BIND") {
            self.server.bind = bind;
        }
        if let Some(location) = lookup("SA_DEFAULT_LOCATION") {
            self.server.default_location = location;
        }

        // Groq overrides; API_KEY is the older name still found in .env files
        if let Some(api_key) = lookup("GROQ_API_KEY").or_else(|| lookup("API_KEY")) {
            self.groq.api_key = api_key;
        }
        if let Some(base_url) = lookup("GROQ_BASE_URL") {
            self.groq.base_url = base_url;
        }
        // GROQ_MODEL sets both; the per-step keys win over it
        if let Some(model) = lookup("GROQ_MODEL") {
            self.groq.refine_model = model.clone();
            self.groq.summary_model = model;
        }
        if let Some(model) = lookup("GROQ_REFINE_MODEL") {
            self.groq.refine_model = model;
        }
        if let Some(model) = lookup("GROQ_SUMMARY_MODEL") {
            self.groq.summary_model = model;
        }

        // SerpApi overrides
        if let Some(api_key) = lookup("SERPAPI_API_KEY") {
            self.serpapi.api_key = api_key;
        }
        if let Some(base_url) = lookup("SERPAPI_BASE_URL") {
            self.serpapi.base_url = base_url;
        }

        // Retry overrides
        if let Some(attempts) = lookup("SA_RETRY_MAX_ATTEMPTS") {
            if let Ok(attempts) = attempts.parse() {
                self.retry.max_attempts = attempts;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ShoppingAssistantError::Config(format!(
                "server.bind '{}' is not a valid host:port",
                self.server.bind
            )));
        }

        if self.groq.api_key == PLACEHOLDER_GROQ_API_KEY || self.groq.api_key.is_empty() {
            return Err(ShoppingAssistantError::Config(
                "GROQ_API_KEY environment variable must be set".to_string(),
            ));
        }

        if self.serpapi.api_key == PLACEHOLDER_SERPAPI_API_KEY || self.serpapi.api_key.is_empty()
        {
            return Err(ShoppingAssistantError::Config(
                "SERPAPI_API_KEY environment variable must be set".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ShoppingAssistantError::Config(
                "retry.max_attempts cannot be 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_factor) {
            return Err(ShoppingAssistantError::Config(
                "retry.jitter_factor must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }
}

impl GroqConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl SerpApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl RetryConfig {
    pub fn max_elapsed(&self) -> Duration {
        Duration::from_secs(self.max_elapsed_seconds)
    }
}
