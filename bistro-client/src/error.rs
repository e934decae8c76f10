//! Client error types

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Location permission refused by the user
    #[error("Location permission denied")]
    PermissionDenied,

    /// Location services switched off on the device
    #[error("Location services are disabled")]
    ServiceDisabled,

    /// No fix (timeout or no signal)
    #[error("Location fix unavailable: {0}")]
    FixUnavailable(String),

    /// Reverse lookup failed; the fix itself is still usable
    #[error("Reverse geocoding unavailable: {0}")]
    GeocodeUnavailable(String),

    /// Key-value store read/write failed
    #[error("Persistence failure on '{key}': {reason}")]
    PersistenceFailure { key: String, reason: String },

    /// Persisted snapshot could not be decoded
    #[error("Corrupt state under '{key}': {reason}")]
    CorruptState { key: String, reason: String },

    /// Wrong email or password
    #[error("Invalid credential")]
    InvalidCredential,

    /// Email already registered
    #[error("Account already exists")]
    AccountExists,

    /// Password rejected by the identity backend
    #[error("Weak credential: {0}")]
    WeakCredential(String),

    /// Too many attempts
    #[error("Rate limited")]
    RateLimited,

    /// Transport-level failure talking to a remote service
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Remote payload does not have the expected shape
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Authentication required
    #[error("Authentication required")]
    NotAuthenticated,

    /// Checkout attempted with nothing in the cart
    #[error("Cart is empty")]
    EmptyCart,

    /// Card payment selected without a saved card
    #[error("A card must be selected for {0}")]
    CardRequired(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn persistence(key: &str, reason: impl ToString) -> Self {
        Self::PersistenceFailure {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn corrupt(key: &str, reason: impl ToString) -> Self {
        Self::CorruptState {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Map to the unified error code table
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PermissionDenied => ErrorCode::LocationPermissionDenied,
            Self::ServiceDisabled => ErrorCode::LocationServiceDisabled,
            Self::FixUnavailable(_) => ErrorCode::FixUnavailable,
            Self::GeocodeUnavailable(_) => ErrorCode::GeocodeUnavailable,
            Self::PersistenceFailure { .. } => ErrorCode::PersistenceFailed,
            Self::CorruptState { .. } => ErrorCode::StorageCorrupted,
            Self::InvalidCredential => ErrorCode::InvalidCredentials,
            Self::AccountExists => ErrorCode::AccountExists,
            Self::WeakCredential(_) => ErrorCode::WeakCredential,
            Self::RateLimited => ErrorCode::RateLimited,
            Self::NetworkUnavailable(_) => ErrorCode::NetworkError,
            Self::SchemaMismatch(_) => ErrorCode::SchemaMismatch,
            Self::NotAuthenticated => ErrorCode::NotAuthenticated,
            Self::EmptyCart => ErrorCode::CartEmpty,
            Self::CardRequired(_) => ErrorCode::PaymentCardRequired,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Internal(_) => ErrorCode::InternalError,
            Self::Http(e) if e.is_connect() || e.is_timeout() => ErrorCode::NetworkError,
            Self::Http(_) => ErrorCode::InternalError,
            Self::Serialization(_) => ErrorCode::InvalidFormat,
        }
    }

    /// Cloneable projection kept in a store's error field
    pub fn to_app_error(&self) -> AppError {
        AppError::with_message(self.code(), self.to_string())
    }
}

impl From<AppError> for ClientError {
    fn from(err: AppError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => Self::Validation(err.message),
            ErrorCode::NotFound => Self::NotFound(err.message),
            _ => Self::Internal(err.message),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_taxonomy() {
        assert_eq!(
            ClientError::PermissionDenied.code(),
            ErrorCode::LocationPermissionDenied
        );
        assert_eq!(
            ClientError::corrupt("cart", "eof").code(),
            ErrorCode::StorageCorrupted
        );
        assert_eq!(
            ClientError::persistence("cart", "disk full").code(),
            ErrorCode::PersistenceFailed
        );
        assert_eq!(ClientError::EmptyCart.code(), ErrorCode::CartEmpty);
    }

    #[test]
    fn test_to_app_error_keeps_message() {
        let err = ClientError::persistence("currentOrder", "disk full");
        let app = err.to_app_error();
        assert_eq!(app.code, ErrorCode::PersistenceFailed);
        assert_eq!(
            app.message,
            "Persistence failure on 'currentOrder': disk full"
        );
    }

    #[test]
    fn test_from_app_error() {
        let err: ClientError = AppError::validation("bad price").into();
        assert!(matches!(err, ClientError::Validation(msg) if msg == "bad price"));
    }
}
