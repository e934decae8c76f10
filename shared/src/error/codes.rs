//! Unified error codes for the Bistro client
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Location errors
//! - 3xxx: Storage errors
//! - 4xxx: Order and cart errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the UI layer can match
/// on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid format
    InvalidFormat = 6,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// An account with this email already exists
    AccountExists = 1003,
    /// Password rejected by the identity backend
    WeakCredential = 1004,
    /// Too many attempts
    RateLimited = 1005,

    // ==================== 2xxx: Location ====================
    /// Location permission refused
    LocationPermissionDenied = 2001,
    /// Location services switched off on the device
    LocationServiceDisabled = 2002,
    /// No fix could be acquired
    FixUnavailable = 2003,
    /// Reverse geocoding failed
    GeocodeUnavailable = 2004,

    // ==================== 3xxx: Storage ====================
    /// Key-value persistence failed
    PersistenceFailed = 3001,
    /// Persisted snapshot could not be decoded
    StorageCorrupted = 3002,

    // ==================== 4xxx: Order ====================
    /// Cart is empty
    CartEmpty = 4002,

    // ==================== 5xxx: Payment ====================
    /// Card payment selected without a card
    PaymentCardRequired = 5001,

    // ==================== 6xxx: Catalog ====================
    /// Catalog payload does not match the expected schema
    SchemaMismatch = 6002,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Network unavailable
    NetworkError = 9003,
}

impl ErrorCode {
    /// Get the numeric value of this error code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidFormat => "Invalid format",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::AccountExists => "An account with this email already exists",
            ErrorCode::WeakCredential => "Password is too weak",
            ErrorCode::RateLimited => "Too many attempts, try again later",

            // Location
            ErrorCode::LocationPermissionDenied => "Location permission is required.",
            ErrorCode::LocationServiceDisabled => "Location services are disabled",
            ErrorCode::FixUnavailable => "Unable to retrieve location.",
            ErrorCode::GeocodeUnavailable => "Unable to retrieve address.",

            // Storage
            ErrorCode::PersistenceFailed => "Failed to write local storage",
            ErrorCode::StorageCorrupted => "Saved data is corrupted",

            // Order
            ErrorCode::CartEmpty => "Cart is empty",

            // Payment
            ErrorCode::PaymentCardRequired => "Please select a card.",

            // Catalog
            ErrorCode::SchemaMismatch => "Catalog data has an unexpected shape",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::NetworkError => "Network unavailable",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            6 => Ok(ErrorCode::InvalidFormat),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::AccountExists),
            1004 => Ok(ErrorCode::WeakCredential),
            1005 => Ok(ErrorCode::RateLimited),

            // Location
            2001 => Ok(ErrorCode::LocationPermissionDenied),
            2002 => Ok(ErrorCode::LocationServiceDisabled),
            2003 => Ok(ErrorCode::FixUnavailable),
            2004 => Ok(ErrorCode::GeocodeUnavailable),

            // Storage
            3001 => Ok(ErrorCode::PersistenceFailed),
            3002 => Ok(ErrorCode::StorageCorrupted),

            // Order
            4002 => Ok(ErrorCode::CartEmpty),

            // Payment
            5001 => Ok(ErrorCode::PaymentCardRequired),

            // Catalog
            6002 => Ok(ErrorCode::SchemaMismatch),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9003 => Ok(ErrorCode::NetworkError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
