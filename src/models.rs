use serde::{Deserialize, Deserializer, Serialize};

/// Flexible text deserializer: SerpApi sends ratings and review counts as
/// numbers for some listings and as strings for others
fn deserialize_flexible_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleText {
        Text(String),
        Number(serde_json::Number),
        Bool(bool),
    }

    let value = Option::<FlexibleText>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        FlexibleText::Text(s) => s,
        FlexibleText::Number(n) => n.to_string(),
        FlexibleText::Bool(b) => b.to_string(),
    }))
}

/// Form fields posted to `/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
    pub location: Option<String>,
}

/// Structured output of the query refinement prompt
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RefinedQuery {
    pub refined_query: String,
    #[serde(default)]
    pub additional_info: String,
}

impl RefinedQuery {
    /// The string actually sent to the product search
    pub fn search_text(&self) -> String {
        format!("{} {}", self.refined_query, self.additional_info)
            .trim()
            .to_string()
    }
}

/// One Google Shopping listing as returned by SerpApi
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Product {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub product_link: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_text")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_text")]
    pub old_price: Option<String>,
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_flexible_text")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_text")]
    pub reviews: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub delivery: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

// Groq chat message format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

// Groq API request format
#[derive(Debug, Serialize, Clone)]
pub struct GroqRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
}

// Groq API response format
#[derive(Debug, Deserialize)]
pub struct GroqResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_accepts_numeric_and_string_fields() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "title": "Sony WH-1000XM5",
            "price": "$348.00",
            "rating": 4.7,
            "reviews": 5123,
            "extensions": ["Free shipping", "15% off"]
        }))
        .expect("listing should deserialize");

        assert_eq!(product.rating.as_deref(), Some("4.7"));
        assert_eq!(product.reviews.as_deref(), Some("5123"));
        assert_eq!(product.extensions.map(|e| e.len()), Some(2));
        assert!(product.thumbnail.is_none());

        let product: Product = serde_json::from_value(serde_json::json!({
            "rating": "4.2",
            "reviews": "1.2K",
            "old_price": null
        }))
        .expect("string variants should deserialize");
        assert_eq!(product.rating.as_deref(), Some("4.2"));
        assert_eq!(product.reviews.as_deref(), Some("1.2K"));
        assert!(product.old_price.is_none());
    }

    #[test]
    fn test_search_text_trims_empty_additional_info() {
        let refined = RefinedQuery {
            refined_query: "wireless noise cancelling headphones".to_string(),
            additional_info: String::new(),
        };
        assert_eq!(refined.search_text(), "wireless noise cancelling headphones");

        let refined = RefinedQuery {
            refined_query: "running shoes".to_string(),
            additional_info: "lightweight cushioned".to_string(),
        };
        assert_eq!(refined.search_text(), "running shoes lightweight cushioned");
    }
}
