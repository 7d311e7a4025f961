//! Scripted collaborators shared by the unit tests
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{Result, ShoppingAssistantError};
use crate::models::{ChatMessage, Choice, GroqRequest, GroqResponse, Product};
use crate::search::ProductSearch;
use crate::transport::Transport;

/// Transport that replays canned completions in order and records every prompt
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    pub requests: Mutex<Vec<GroqRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, content: &str) -> Self {
        self.replies
            .lock()
            .expect("Mock transport mutex should not be poisoned")
            .push_back(Ok(content.to_string()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .expect("Mock transport mutex should not be poisoned")
            .push_back(Err(message.to_string()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("Mock transport mutex should not be poisoned")
            .iter()
            .map(|r| r.messages[0].content.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn chat(&self, req: &GroqRequest) -> Result<GroqResponse> {
        self.requests
            .lock()
            .expect("Mock transport mutex should not be poisoned")
            .push(req.clone());
        let next = self
            .replies
            .lock()
            .expect("Mock transport mutex should not be poisoned")
            .pop_front();
        match next {
            Some(Ok(content)) => Ok(GroqResponse {
                choices: vec![Choice {
                    message: ChatMessage {
                        role: "assistant".to_string(),
                        content,
                    },
                }],
            }),
            Some(Err(message)) => Err(ShoppingAssistantError::upstream("Groq", message)),
            None => Err(ShoppingAssistantError::Internal(
                "No more mock responses".to_string(),
            )),
        }
    }
}

/// Product search returning a fixed listing and recording its inputs
pub struct FixedSearch {
    products: std::result::Result<Vec<Product>, String>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FixedSearch {
    pub fn returning(products: Vec<Product>) -> Self {
        Self {
            products: Ok(products),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            products: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .expect("Mock search mutex should not be poisoned")
            .clone()
    }
}

#[async_trait]
impl ProductSearch for FixedSearch {
    async fn search(&self, query: &str, location: &str) -> Result<Vec<Product>> {
        self.calls
            .lock()
            .expect("Mock search mutex should not be poisoned")
            .push((query.to_string(), location.to_string()));
        match &self.products {
            Ok(products) => Ok(products.clone()),
            Err(message) => Err(ShoppingAssistantError::upstream("SerpApi", message.clone())),
        }
    }
}

pub fn product(title: &str, price: &str, rating: &str) -> Product {
    Product {
        title: Some(title.to_string()),
        product_link: Some(format!(
            "https://shop.example.com/{}",
            title.to_lowercase().replace(' ', "-")
        )),
        price: Some(price.to_string()),
        rating: Some(rating.to_string()),
        reviews: Some("120".to_string()),
        source: Some("Example Store".to_string()),
        delivery: Some("Free delivery".to_string()),
        thumbnail: Some("https://img.example.com/thumb.jpg".to_string()),
        ..Product::default()
    }
}
