//! Cart Model

use serde::{Deserialize, Serialize};

use super::product::Product;
use crate::error::AppError;
use crate::money;

/// One cart line, unique by `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product reference (catalog id)
    pub id: String,
    pub title: String,
    /// Unit price in currency unit
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub thumbnail_url: String,
}

impl CartItem {
    /// Build a cart line from a catalog product
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            quantity,
            thumbnail_url: product.thumbnail_url.clone(),
        }
    }

    /// Reject lines that can never be stored
    pub fn validate(&self) -> Result<(), AppError> {
        if self.id.is_empty() {
            return Err(AppError::validation("cart item id must not be empty"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::validation(format!(
                "price must be a non-negative number, got {}",
                self.price
            ))
            .with_detail("item_id", self.id.clone()));
        }
        Ok(())
    }

    /// Price × quantity, rounded to cents
    pub fn line_total(&self) -> f64 {
        money::to_f64(money::line_total(self.price, self.quantity))
    }
}

/// Cart snapshot
///
/// Persisted as a JSON array of [`CartItem`]. Entries never carry a zero
/// quantity: a line that drops to zero is removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Sum of quantities across all lines
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Σ(price × quantity), rounded to cents
    pub fn total(&self) -> f64 {
        let sum = self
            .items
            .iter()
            .map(|item| money::line_total(item.price, item.quantity))
            .sum();
        money::to_f64(sum)
    }

    /// Add `item.quantity` units of `item`
    ///
    /// Returns `false` (no change) when the quantity is zero.
    pub fn add(&mut self, item: CartItem) -> bool {
        if item.quantity == 0 {
            return false;
        }
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => self.items.push(item),
        }
        true
    }

    /// Take `decrement_by` units of `id` out of the cart
    ///
    /// Returns `false` when `id` is absent or `decrement_by` is zero.
    pub fn remove(&mut self, id: &str, decrement_by: u32) -> bool {
        if decrement_by == 0 {
            return false;
        }
        let Some(pos) = self.items.iter().position(|item| item.id == id) else {
            return false;
        };
        let remaining = self.items[pos].quantity.saturating_sub(decrement_by);
        if remaining == 0 {
            self.items.remove(pos);
        } else {
            self.items[pos].quantity = remaining;
        }
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
