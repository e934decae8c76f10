//! Checkout
//!
//! Prices the cart and turns it into the current order. Placing an order
//! touches two stores and is not atomic: the order is saved first and the
//! cart cleared second. If the clear fails the order stays saved and the
//! cart keeps its items, so nothing the user entered is lost.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{Cart, Order, OrderAddress, OrderLine};
use shared::money::{line_total, round_money, to_decimal, to_f64};
use shared::util::order_token;

use crate::cart::CartStore;
use crate::error::{ClientError, ClientResult};
use crate::order::OrderStore;

/// Tax and delivery rules
#[derive(Debug, Clone, PartialEq)]
pub struct PricingPolicy {
    /// Fraction of the subtotal (0.08 = 8%)
    pub tax_rate: f64,
    pub delivery_fee: f64,
    /// Delivery is free when the subtotal is strictly above this
    pub free_delivery_over: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: 0.08,
            delivery_fee: 5.99,
            free_delivery_over: 50.0,
        }
    }
}

/// Price breakdown, every field rounded to cents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderQuote {
    pub subtotal: f64,
    pub tax: f64,
    pub delivery: f64,
    pub total: f64,
}

impl PricingPolicy {
    pub fn quote(&self, cart: &Cart) -> OrderQuote {
        let subtotal: Decimal = cart
            .items()
            .iter()
            .map(|item| line_total(item.price, item.quantity))
            .sum();
        let subtotal = round_money(subtotal);
        let tax = round_money(subtotal * to_decimal(self.tax_rate));
        let delivery = if subtotal > to_decimal(self.free_delivery_over) {
            Decimal::ZERO
        } else {
            to_decimal(self.delivery_fee)
        };

        OrderQuote {
            subtotal: to_f64(subtotal),
            tax: to_f64(tax),
            delivery: to_f64(delivery),
            total: to_f64(subtotal + tax + delivery),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Visa,
    Mastercard,
    PayPal,
}

impl PaymentMethod {
    pub fn requires_card(self) -> bool {
        matches!(self, PaymentMethod::Visa | PaymentMethod::Mastercard)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::Visa => write!(f, "Visa"),
            PaymentMethod::Mastercard => write!(f, "Mastercard"),
            PaymentMethod::PayPal => write!(f, "PayPal"),
        }
    }
}

/// Payment method plus the saved card it is charged to, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub method: PaymentMethod,
    pub card_id: Option<String>,
}

impl Payment {
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            card_id: None,
        }
    }

    pub fn with_card(mut self, card_id: impl Into<String>) -> Self {
        self.card_id = Some(card_id.into());
        self
    }

    fn validate(&self) -> ClientResult<()> {
        let has_card = self.card_id.as_deref().is_some_and(|id| !id.is_empty());
        if self.method.requires_card() && !has_card {
            return Err(ClientError::CardRequired(self.method.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Checkout {
    cart: Arc<CartStore>,
    orders: Arc<OrderStore>,
    pricing: PricingPolicy,
}

impl Checkout {
    pub fn new(cart: Arc<CartStore>, orders: Arc<OrderStore>, pricing: PricingPolicy) -> Self {
        Self {
            cart,
            orders,
            pricing,
        }
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    /// Quote for the current cart
    pub fn quote(&self) -> OrderQuote {
        self.pricing.quote(&self.cart.snapshot())
    }

    /// Turn the current cart into the current order
    ///
    /// Without an address the order is sent to [`OrderAddress::unknown`].
    pub async fn place_order(
        &self,
        payment: &Payment,
        address: Option<OrderAddress>,
    ) -> ClientResult<Order> {
        payment.validate()?;

        let cart = self.cart.snapshot();
        if cart.is_empty() {
            return Err(ClientError::EmptyCart);
        }

        let quote = self.pricing.quote(&cart);
        let order = Order {
            id: order_token(),
            items: cart.items().iter().map(OrderLine::from).collect(),
            total: quote.total,
            timestamp: None,
            order_address: Some(address.unwrap_or_else(OrderAddress::unknown)),
        };

        let order = self.orders.save(order).await?;
        tracing::info!(
            order_id = %order.id,
            method = %payment.method,
            total = quote.total,
            "Order placed"
        );

        if let Err(e) = self.cart.clear().await {
            tracing::error!(
                order_id = %order.id,
                error = %e,
                "Order saved but cart could not be cleared"
            );
            return Err(e);
        }
        Ok(order)
    }

    /// The user received the order; drop the slot
    pub async fn confirm_delivery(&self) -> ClientResult<()> {
        self.orders.clear().await
    }
}
