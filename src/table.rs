//! Comparison table built from search results.
//!
//! Two views come out of the same rows: an HTML table for the page (links,
//! star suffix and thumbnails) and plain records for the summary prompt.
use serde::Serialize;

use crate::error::Result;
use crate::html::escape_html;
use crate::models::Product;

/// Upper bound on listings shown to the user and sent to the summarizer
pub const MAX_PRODUCTS: usize = 5;

pub const DISPLAY_COLUMNS: [&str; 9] = [
    "Name",
    "Price Now",
    "Original Price",
    "Special Offer",
    "Rating",
    "Reviews",
    "Store",
    "Delivery",
    "Image",
];

const MISSING: &str = "N/A";
const MISSING_URL: &str = "#";
const NO_DISCOUNT: &str = "No Discount";

/// One listing with every value resolved to display text
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub name: String,
    pub link: String,
    pub price_now: String,
    pub original_price: String,
    pub special_offer: String,
    pub rating: String,
    pub reviews: String,
    pub store: String,
    pub delivery: String,
    pub image: String,
}

fn or_missing(value: &Option<String>, fallback: &str) -> String {
    value.clone().unwrap_or_else(|| fallback.to_string())
}

impl ComparisonRow {
    pub fn from_product(p: &Product) -> Self {
        let special_offer = match &p.extensions {
            Some(ext) if !ext.is_empty() => ext.join(", "),
            _ => NO_DISCOUNT.to_string(),
        };

        Self {
            name: or_missing(&p.title, MISSING),
            link: or_missing(&p.product_link, MISSING_URL),
            price_now: or_missing(&p.price, MISSING),
            original_price: or_missing(&p.old_price, MISSING),
            special_offer,
            rating: or_missing(&p.rating, MISSING),
            reviews: format!("{} Reviews", p.reviews.as_deref().unwrap_or(MISSING)),
            store: or_missing(&p.source, MISSING),
            delivery: or_missing(&p.delivery, MISSING),
            image: or_missing(&p.thumbnail, MISSING_URL),
        }
    }

    /// Cells in `DISPLAY_COLUMNS` order, already HTML
    fn display_cells(&self) -> [String; 9] {
        [
            format!(
                "<a href='{}'>{}</a>",
                escape_html(&self.link),
                escape_html(&self.name)
            ),
            escape_html(&self.price_now),
            escape_html(&self.original_price),
            escape_html(&self.special_offer),
            format!("{} ⭐", escape_html(&self.rating)),
            escape_html(&self.reviews),
            escape_html(&self.store),
            escape_html(&self.delivery),
            format!(
                "<img src='{}' style='height:50px;'/>",
                escape_html(&self.image)
            ),
        ]
    }
}

/// Row shape handed to the language model; no markup, no image
#[derive(Debug, Serialize)]
pub struct PromptRecord<'a> {
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "Price Now")]
    pub price_now: &'a str,
    #[serde(rename = "Original Price")]
    pub original_price: &'a str,
    #[serde(rename = "Special Offer")]
    pub special_offer: &'a str,
    #[serde(rename = "Rating")]
    pub rating: &'a str,
    #[serde(rename = "Reviews")]
    pub reviews: &'a str,
    #[serde(rename = "Store")]
    pub store: &'a str,
    #[serde(rename = "Delivery")]
    pub delivery: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct ComparisonTable {
    rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    /// Keep the first `MAX_PRODUCTS` listings in API order
    pub fn from_products(products: &[Product]) -> Self {
        Self {
            rows: products
                .iter()
                .take(MAX_PRODUCTS)
                .map(ComparisonRow::from_product)
                .collect(),
        }
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn prompt_records(&self) -> Vec<PromptRecord<'_>> {
        self.rows
            .iter()
            .map(|r| PromptRecord {
                name: &r.name,
                price_now: &r.price_now,
                original_price: &r.original_price,
                special_offer: &r.special_offer,
                rating: &r.rating,
                reviews: &r.reviews,
                store: &r.store,
                delivery: &r.delivery,
            })
            .collect()
    }

    pub fn prompt_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.prompt_records())?)
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n  <thead>\n");
        html.push_str("    <tr style=\"text-align: right;\">\n");
        for column in DISPLAY_COLUMNS {
            html.push_str(&format!("      <th>{column}</th>\n"));
        }
        html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
        for row in &self.rows {
            html.push_str("    <tr>\n");
            for cell in row.display_cells() {
                html.push_str(&format!("      <td>{cell}</td>\n"));
            }
            html.push_str("    </tr>\n");
        }
        html.push_str("  </tbody>\n</table>");
        html
    }
}
