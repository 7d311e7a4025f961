use thiserror::Error;

/// Errors raised while serving a shopping search
#[derive(Error, Debug)]
pub enum ShoppingAssistantError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{service} returned an error: {message}")]
    Upstream { service: &'static str, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShoppingAssistantError {
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShoppingAssistantError>;
