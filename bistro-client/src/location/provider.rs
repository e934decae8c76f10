//! Device location capability
//!
//! The host platform implements [`LocationProvider`]; the store only ever
//! talks to this trait.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::models::{Coordinates, GeocodedAddress};
use tokio::sync::mpsc;

use crate::error::ClientResult;

/// Requested fix accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accuracy {
    Lowest,
    Low,
    Balanced,
    High,
    Highest,
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accuracy::Lowest => write!(f, "Lowest"),
            Accuracy::Low => write!(f, "Low"),
            Accuracy::Balanced => write!(f, "Balanced"),
            Accuracy::High => write!(f, "High"),
            Accuracy::Highest => write!(f, "Highest"),
        }
    }
}

/// Continuous tracking options
#[derive(Debug, Clone, PartialEq)]
pub struct WatchOptions {
    pub accuracy: Accuracy,
    /// Minimum time between updates
    pub interval: Duration,
    /// Minimum movement between updates, in meters
    pub distance_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::Highest,
            interval: Duration::from_millis(2000),
            distance_m: 2.0,
        }
    }
}

/// Foreground location permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Never asked
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// A single position fix
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub coordinates: Coordinates,
    /// Horizontal accuracy radius, when the platform reports one
    pub accuracy_m: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Fix {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            accuracy_m: None,
            timestamp: Utc::now(),
        }
    }
}

/// Stream of fixes from a watch subscription
///
/// Dropping the receiver ends the subscription on the provider side.
pub type FixStream = mpsc::Receiver<ClientResult<Fix>>;

#[async_trait]
pub trait LocationProvider: Send + Sync + fmt::Debug {
    /// Current permission, without prompting
    async fn permission_status(&self) -> ClientResult<PermissionStatus>;

    /// Prompt the user for foreground permission
    async fn request_permission(&self) -> ClientResult<PermissionStatus>;

    async fn services_enabled(&self) -> ClientResult<bool>;

    /// One fix; `FixUnavailable` or `ServiceDisabled` on failure
    async fn current_fix(&self, accuracy: Accuracy) -> ClientResult<Fix>;

    async fn watch_position(&self, options: &WatchOptions) -> ClientResult<FixStream>;

    /// Addresses for `coordinates`, best match first
    async fn reverse_geocode(&self, coordinates: Coordinates)
    -> ClientResult<Vec<GeocodedAddress>>;
}
