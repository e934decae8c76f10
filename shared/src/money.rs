//! Money calculation utilities using rust_decimal for precision
//!
//! Prices travel as `f64` in models and JSON snapshots. All arithmetic is
//! done in `Decimal` and rounded back to cents at the boundary.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
///
/// Non-finite input is logged and treated as zero.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round a Decimal to cents
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_else(|| {
        tracing::error!(value = %value, "Decimal not representable as f64, defaulting to zero");
        0.0
    })
}

/// Price × quantity for one line
#[inline]
pub fn line_total(price: f64, quantity: u32) -> Decimal {
    to_decimal(price) * Decimal::from(quantity)
}
