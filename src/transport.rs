use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::config::{GroqConfig, RetryConfig};
use crate::error::{Result, ShoppingAssistantError};
use crate::models::{ChatMessage, GroqRequest, GroqResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn chat(&self, req: &GroqRequest) -> Result<GroqResponse>;
}

/// Send `prompt` as a single user turn and return the first choice's text
pub async fn complete(
    tx: &dyn Transport,
    model: &str,
    prompt: String,
    temperature: f32,
    max_tokens: i32,
) -> Result<String> {
    let request = GroqRequest {
        model: model.to_string(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: prompt,
        }],
        temperature,
        max_tokens,
        response_format: None,
    };

    let groq_response = tx.chat(&request).await?;

    groq_response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| {
            ShoppingAssistantError::upstream("Groq", "API returned empty choices")
        })
}

pub struct GroqTransport {
    client: Client,
    api_key: String,
    endpoint: String,
    retry: RetryConfig,
}

impl GroqTransport {
    pub fn new(cfg: &GroqConfig, retry: RetryConfig) -> Result<Self> {
        let client = Client::builder().timeout(cfg.timeout()).build()?;
        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            endpoint: format!("{}/chat/completions", cfg.base_url.trim_end_matches('/')),
            retry,
        })
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self
            .retry
            .initial_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let spread = if self.retry.jitter_factor.is_finite() {
            self.retry.jitter_factor.min(1.0)
        } else {
            0.0
        };
        let jitter = if spread > 0.0 {
            rand::thread_rng().gen_range((1.0 - spread)..=(1.0 + spread))
        } else {
            1.0
        };
        let delay = Duration::from_millis((base as f64 * jitter) as u64);

        // Cap the delay to prevent excessive waiting
        std::cmp::min(delay, Duration::from_millis(self.retry.max_delay_ms))
    }
}

/// Client errors other than rate limiting will not succeed on retry
fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl Transport for GroqTransport {
    async fn chat(&self, req: &GroqRequest) -> Result<GroqResponse> {
        let start_time = Instant::now();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempts = 0;

        while attempts < max_attempts {
            if start_time.elapsed() > self.retry.max_elapsed() {
                return Err(ShoppingAssistantError::upstream(
                    "Groq",
                    format!(
                        "request timed out after {} seconds (max retry duration exceeded)",
                        self.retry.max_elapsed_seconds
                    ),
                ));
            }

            attempts += 1;

            match self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(req)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json().await.map_err(|e| {
                            ShoppingAssistantError::upstream(
                                "Groq",
                                format!("failed to parse response: {e}"),
                            )
                        });
                    }

                    if attempts >= max_attempts || !is_retryable(status) {
                        let body = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        return Err(ShoppingAssistantError::upstream(
                            "Groq",
                            format!("{status} after {attempts} attempts: {body}"),
                        ));
                    }
                    tracing::warn!(%status, attempts, "Groq request failed, retrying");
                }
                Err(e) => {
                    if attempts >= max_attempts {
                        return Err(ShoppingAssistantError::upstream(
                            "Groq",
                            format!("failed to send request after {attempts} attempts: {e}"),
                        ));
                    }
                    tracing::warn!(error = %e, attempts, "Groq request error, retrying");
                }
            }

            sleep(self.backoff_delay(attempts)).await;
        }

        Err(ShoppingAssistantError::upstream(
            "Groq",
            format!("request failed after {max_attempts} attempts"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn transport_for(server: &MockServer, max_attempts: u32) -> GroqTransport {
        let cfg = GroqConfig {
            api_key: "gsk_test".to_string(),
            base_url: server.url("/openai/v1"),
            ..GroqConfig::default()
        };
        let retry = RetryConfig {
            max_attempts,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            ..RetryConfig::default()
        };
        GroqTransport::new(&cfg, retry).expect("client should build")
    }

    fn request() -> GroqRequest {
        GroqRequest {
            model: "llama3-70b-8192".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "What is the capital of France?".to_string(),
            }],
            temperature: 0.0,
            max_tokens: 100,
            response_format: None,
        }
    }

    #[test]
    fn test_backoff_delay_tolerates_bad_jitter() {
        let server = MockServer::start();
        for jitter_factor in [f64::INFINITY, f64::NAN, -1.0, 5.0] {
            let mut tx = transport_for(&server, 3);
            tx.retry.jitter_factor = jitter_factor;
            tx.retry.initial_delay_ms = 100;
            tx.retry.max_delay_ms = 1_000;
            for attempt in 1..=4 {
                assert!(tx.backoff_delay(attempt) <= Duration::from_millis(1_000));
            }
        }
    }

    #[tokio::test]
    async fn test_chat_sends_bearer_and_parses_choices() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/openai/v1/chat/completions")
                    .header("Authorization", "Bearer gsk_test")
                    .json_body_partial(r#"{"model": "llama3-70b-8192"}"#);
                then.status(200).json_body(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "Paris"}}]
                }));
            })
            .await;

        let tx = transport_for(&server, 3);
        let text = complete(&tx, "llama3-70b-8192", "What is the capital of France?".into(), 0.0, 10)
            .await
            .expect("completion should succeed");

        assert_eq!(text, "Paris");
        mock.assert_async().await;

        let res = tx.chat(&request()).await.expect("chat should succeed");
        assert_eq!(res.choices.len(), 1);
    }

    #[tokio::test]
    async fn test_chat_retries_server_errors() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/openai/v1/chat/completions");
                then.status(503).body("overloaded");
            })
            .await;

        let tx = transport_for(&server, 3);
        let err = tx.chat(&request()).await.unwrap_err();

        assert!(err.to_string().contains("after 3 attempts"), "{err}");
        mock.assert_hits_async(3).await;
    }

    #[tokio::test]
    async fn test_chat_does_not_retry_client_errors() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/openai/v1/chat/completions");
                then.status(401).body("invalid api key");
            })
            .await;

        let tx = transport_for(&server, 5);
        let err = tx.chat(&request()).await.unwrap_err();

        assert!(matches!(err, ShoppingAssistantError::Upstream { .. }));
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_choices() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/openai/v1/chat/completions");
                then.status(200).json_body(serde_json::json!({"choices": []}));
            })
            .await;

        let tx = transport_for(&server, 1);
        let err = complete(&tx, "m", "hi".into(), 0.0, 10).await.unwrap_err();
        assert!(err.to_string().contains("empty choices"));
    }
}
