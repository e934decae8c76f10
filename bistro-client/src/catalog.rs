//! Remote catalog client
//!
//! Read-only, unauthenticated product API. Payloads are decoded into loosely
//! typed [`RawProduct`] records and validated into [`Product`] before they
//! leave this module.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use shared::models::Product;
use shared::money::{round_money, to_decimal, to_f64};

use crate::{ClientConfig, ClientError, ClientResult};

/// Product record as sent by the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub id: Option<Value>,
    pub title: Option<String>,
    pub price: Option<f64>,
    #[serde(alias = "thumbnailUrl", alias = "image")]
    pub thumbnail: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductPage {
    products: Vec<RawProduct>,
}

impl RawProduct {
    /// Check required fields and normalize into a [`Product`]
    pub fn validate(self) -> ClientResult<Product> {
        let id = match self.id {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(ClientError::SchemaMismatch(format!(
                    "product id must be a string or number, got {}",
                    other
                )));
            }
            None => return Err(ClientError::SchemaMismatch("product id missing".to_string())),
        };

        let title = self
            .title
            .ok_or_else(|| ClientError::SchemaMismatch(format!("product {} has no title", id)))?;

        let price = match self.price {
            Some(price) if price.is_finite() && price >= 0.0 => price,
            Some(price) => {
                return Err(ClientError::SchemaMismatch(format!(
                    "product {} has invalid price {}",
                    id, price
                )));
            }
            None => {
                return Err(ClientError::SchemaMismatch(format!(
                    "product {} has no price",
                    id
                )));
            }
        };

        Ok(Product {
            id,
            title,
            price: to_f64(round_money(to_decimal(price))),
            thumbnail_url: self.thumbnail.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
        })
    }
}

/// Decode a `{"products": [...]}` page
pub fn parse_product_list(body: &[u8]) -> ClientResult<Vec<Product>> {
    let page: ProductPage = serde_json::from_slice(body)
        .map_err(|e| ClientError::SchemaMismatch(format!("product list: {}", e)))?;
    page.products.into_iter().map(RawProduct::validate).collect()
}

/// Decode a single product
pub fn parse_product(body: &[u8]) -> ClientResult<Product> {
    let raw: RawProduct = serde_json::from_slice(body)
        .map_err(|e| ClientError::SchemaMismatch(format!("product: {}", e)))?;
    raw.validate()
}

/// Products whose title contains `term`, ignoring case
///
/// A blank term returns every product.
pub fn search(products: &[Product], term: &str) -> Vec<Product> {
    let term = term.trim();
    if term.is_empty() {
        return products.to_vec();
    }
    products.iter().filter(|p| p.matches(term)).cloned().collect()
}

/// HTTP client for the catalog API
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    category: String,
}

impl CatalogClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| ClientError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.catalog_base_url.clone(),
            category: config.catalog_category.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The menu: every product in the configured category
    pub async fn list_products(&self) -> ClientResult<Vec<Product>> {
        let category = self.category.clone();
        self.products_in_category(&category).await
    }

    /// Every product whose category equals `category`
    pub async fn products_in_category(&self, category: &str) -> ClientResult<Vec<Product>> {
        let mut url = self.endpoint(&["products"])?;
        url.query_pairs_mut().append_pair("limit", "0");
        let body = self.get_bytes(url).await?;
        let products: Vec<Product> = parse_product_list(&body)?
            .into_iter()
            .filter(|p| p.category == category)
            .collect();
        tracing::debug!(category = %category, count = products.len(), "Catalog loaded");
        Ok(products)
    }

    /// One product by id; `NotFound` when the catalog has no such id
    pub async fn product(&self, id: &str) -> ClientResult<Product> {
        let url = self.endpoint(&["products", id])?;
        let body = self.get_bytes(url).await?;
        parse_product(&body)
    }

    /// `base_url` with `segments` appended, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::Internal(format!("invalid catalog url {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Internal(format!("catalog url cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_bytes(&self, url: Url) -> ClientResult<Vec<u8>> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Catalog request failed");
            ClientError::NetworkUnavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = %status, "Catalog returned an error");
            return Err(match status {
                StatusCode::NOT_FOUND => {
                    ClientError::NotFound(format!("{}: {}", url.path(), text))
                }
                StatusCode::UNAUTHORIZED => ClientError::NotAuthenticated,
                _ => ClientError::Internal(format!("catalog status {}: {}", status, text)),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::NetworkUnavailable(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
