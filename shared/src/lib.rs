//! Shared types for the Bistro client
//!
//! Domain models persisted by the client stores, the unified error code
//! table, and money/time helpers.

pub mod error;
pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
