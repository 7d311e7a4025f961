//! Rendering of the assistant's single HTML page
use crate::html::escape_html;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>AI Shopping Assistant</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 72rem; padding: 0 1rem; color: #222; }
    form { display: flex; gap: 0.5rem; flex-wrap: wrap; margin-bottom: 1.5rem; }
    input[type=text] { padding: 0.5rem; font-size: 1rem; }
    input[name=query] { flex: 1 1 24rem; }
    button { padding: 0.5rem 1.25rem; font-size: 1rem; cursor: pointer; }
    .error { color: #b00020; font-weight: 600; }
    .refined { color: #555; }
    table.dataframe { border-collapse: collapse; width: 100%; margin: 1rem 0; }
    table.dataframe th, table.dataframe td { border: 1px solid #ccc; padding: 0.4rem 0.6rem; vertical-align: middle; }
    table.dataframe th { background: #f3f3f3; }
    .summary h3 { margin-top: 1.25rem; }
  </style>
</head>
<body>
  <h1>AI Shopping Assistant</h1>
"#;

const PAGE_FOOT: &str = "</body>\n</html>\n";

/// What the page shows; every field but the form values is optional
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub query: String,
    pub location: String,
    pub error: Option<String>,
    pub refined_query: Option<String>,
    /// Trusted HTML produced by the comparison table
    pub comparison_table: Option<String>,
    /// Trusted HTML produced by the summarizer
    pub summary: Option<String>,
}

impl PageContext {
    pub fn form(location: &str) -> Self {
        Self {
            location: location.to_string(),
            ..Self::default()
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

pub fn render(ctx: &PageContext) -> String {
    let mut html = String::from(PAGE_HEAD);

    html.push_str(&format!(
        r#"  <form method="post" action="/search">
    <input type="text" name="query" placeholder="What are you shopping for?" value="{}">
    <input type="text" name="location" placeholder="Location" value="{}">
    <button type="submit">Search</button>
  </form>
"#,
        escape_html(&ctx.query),
        escape_html(&ctx.location)
    ));

    if let Some(error) = &ctx.error {
        html.push_str(&format!(
            "  <p class=\"error\">{}</p>\n",
            escape_html(error)
        ));
    }

    if let Some(refined) = &ctx.refined_query {
        html.push_str(&format!(
            "  <p class=\"refined\">Searched for: <strong>{}</strong></p>\n",
            escape_html(refined)
        ));
    }

    if let Some(table) = &ctx.comparison_table {
        html.push_str("  <h2>Comparison</h2>\n  <div class=\"comparison\">\n");
        html.push_str(table);
        html.push_str("\n  </div>\n");
    }

    if let Some(summary) = &ctx.summary {
        html.push_str("  <h2>Summary</h2>\n  <div class=\"summary\">\n");
        html.push_str(summary);
        html.push_str("\n  </div>\n");
    }

    html.push_str(PAGE_FOOT);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_form() {
        let html = render(&PageContext::form("United States"));
        assert!(html.contains(r#"<form method="post" action="/search">"#));
        assert!(html.contains(r#"name="location" placeholder="Location" value="United States""#));
        assert!(!html.contains("class=\"error\""));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let ctx = PageContext {
            query: r#""><script>alert(1)</script>"#.to_string(),
            location: "Paris".to_string(),
            ..PageContext::default()
        }
        .with_error("Bad <input>");
        let html = render(&ctx);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
        assert!(html.contains("<p class=\"error\">Bad &lt;input&gt;</p>"));
    }

    #[test]
    fn test_results_are_embedded_verbatim() {
        let ctx = PageContext {
            query: "blender".to_string(),
            location: "United States".to_string(),
            refined_query: Some("high speed blender".to_string()),
            comparison_table: Some("<table class=\"dataframe\"></table>".to_string()),
            summary: Some("<h3>Best Value Product</h3>".to_string()),
            ..PageContext::default()
        };
        let html = render(&ctx);

        assert!(html.contains("Searched for: <strong>high speed blender</strong>"));
        assert!(html.contains("<table class=\"dataframe\"></table>"));
        assert!(html.contains("<h3>Best Value Product</h3>"));
    }
}
