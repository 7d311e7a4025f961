//! Prompt layout shared by every completion the assistant requests
use serde_json::Value;

use crate::error::{Result, ShoppingAssistantError};

/// A system / format / user triple rendered into a single completion prompt
#[derive(Debug, Clone)]
pub struct Prompt<'a> {
    pub system: &'a str,
    pub format: &'a str,
    pub user: &'a str,
}

impl Prompt<'_> {
    pub fn render(&self) -> String {
        format!(
            "System: {}\n{}\nHuman: {}\nAI:",
            self.system, self.format, self.user
        )
    }
}

/// Instructions asking the model to answer with a JSON object matching `schema`
pub fn json_format_instructions(schema: &Value) -> String {
    format!(
        "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
         As an example, for the schema {{\"properties\": {{\"foo\": {{\"title\": \"Foo\", \"description\": \"a list of strings\", \"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}}\n\
         the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance of the schema. \
         The object {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not well-formatted.\n\n\
         Here is the output schema:\n```\n{schema}\n```"
    )
}

/// Pull the JSON object out of a completion.
///
/// Models often wrap the object in a fenced block or add a sentence before
/// it, so this tries the whole reply, then a ```json fence, then the
/// outermost braces.
pub fn extract_json(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    if let Some(fenced) = fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(fenced) {
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return serde_json::from_str::<Value>(&trimmed[start..=end]).map_err(Into::into);
        }
    }

    Err(ShoppingAssistantError::Internal(format!(
        "No JSON object found in completion. Raw: {raw}"
    )))
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    // Skip an optional language tag on the opening fence
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_layout() {
        let prompt = Prompt {
            system: "You are helpful.",
            format: "Answer in one word.",
            user: "Hi",
        };
        assert_eq!(
            prompt.render(),
            "System: You are helpful.\nAnswer in one word.\nHuman: Hi\nAI:"
        );
    }

    #[test]
    fn test_format_instructions_embed_schema() {
        let schema = json!({"properties": {"refined_query": {"type": "string"}}});
        let text = json_format_instructions(&schema);
        assert!(text.contains("\"refined_query\""));
        assert!(text.starts_with("The output should be formatted as a JSON instance"));
    }

    #[test]
    fn test_extract_json_variants() {
        let plain = extract_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(plain["a"], 1);

        let fenced = extract_json("Here you go:\n```json\n{\"a\": 2}\n```\nEnjoy").unwrap();
        assert_eq!(fenced["a"], 2);

        let chatty = extract_json("Sure! {\"a\": 3} Let me know.").unwrap();
        assert_eq!(chatty["a"], 3);
    }

    #[test]
    fn test_extract_json_rejects_prose() {
        assert!(extract_json("I could not find anything.").is_err());
    }
}
