//! Product Model

use serde::{Deserialize, Serialize};

/// Catalog product after validation at the ingestion boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    /// Unit price in currency unit, rounded to cents
    pub price: f64,
    pub thumbnail_url: String,
    pub category: String,
}

impl Product {
    /// Case-insensitive title match
    pub fn matches(&self, term: &str) -> bool {
        self.title.to_lowercase().contains(&term.to_lowercase())
    }
}
