//! Unified error system for the Bistro client
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Location errors
//! - 3xxx: Storage errors
//! - 4xxx: Order and cart errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCategory, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::LocationPermissionDenied);
//! assert_eq!(err.code.category(), ErrorCategory::Location);
//!
//! let err = AppError::validation("Please select a card.").with_detail("method", "visa");
//! assert_eq!(err.code, ErrorCode::ValidationFailed);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
