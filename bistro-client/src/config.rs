//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::checkout::PricingPolicy;
use crate::location::WatchOptions;

/// Default public catalog
pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com";

/// Category shown on the menu
pub const DEFAULT_CATALOG_CATEGORY: &str = "groceries";

/// Client configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | BISTRO_DATA_DIR | ./bistro-data | Directory for persisted snapshots |
/// | BISTRO_CATALOG_URL | https://dummyjson.com | Catalog base URL |
/// | BISTRO_CATALOG_CATEGORY | groceries | Menu category |
/// | BISTRO_HTTP_TIMEOUT_SECS | 30 | Catalog request timeout |
/// | BISTRO_WATCH_INTERVAL_MS | 2000 | Location watch interval |
/// | BISTRO_WATCH_DISTANCE_M | 2 | Location watch distance filter |
/// | BISTRO_LOG_LEVEL | info | Log level |
/// | BISTRO_LOG_DIR | (unset) | Daily log file directory |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Where `FileKvStore` keeps its snapshots
    pub data_dir: PathBuf,

    /// Catalog base URL (e.g., "https://dummyjson.com")
    pub catalog_base_url: String,

    /// Category the menu is filtered to
    pub catalog_category: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Continuous location tracking options
    pub watch: WatchOptions,

    /// Checkout pricing
    pub pricing: PricingPolicy,

    pub log_level: String,
    pub log_dir: Option<String>,
}

impl ClientConfig {
    /// Create a configuration with defaults and the given data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            catalog_base_url: DEFAULT_CATALOG_URL.to_string(),
            catalog_category: DEFAULT_CATALOG_CATEGORY.to_string(),
            timeout: 30,
            watch: WatchOptions::default(),
            pricing: PricingPolicy::default(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("BISTRO_DATA_DIR").unwrap_or_else(|_| "./bistro-data".into()),
        );
        if let Ok(url) = std::env::var("BISTRO_CATALOG_URL") {
            config.catalog_base_url = url;
        }
        if let Ok(category) = std::env::var("BISTRO_CATALOG_CATEGORY") {
            config.catalog_category = category;
        }
        config.timeout = std::env::var("BISTRO_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.timeout);
        config.watch.interval = std::env::var("BISTRO_WATCH_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(config.watch.interval);
        config.watch.distance_m = std::env::var("BISTRO_WATCH_DISTANCE_M")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.watch.distance_m);
        if let Ok(level) = std::env::var("BISTRO_LOG_LEVEL") {
            config.log_level = level;
        }
        config.log_dir = std::env::var("BISTRO_LOG_DIR").ok();
        config
    }

    /// Set the catalog base URL
    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_base_url = url.into();
        self
    }

    /// Set the menu category
    pub fn with_catalog_category(mut self, category: impl Into<String>) -> Self {
        self.catalog_category = category.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the location watch options
    pub fn with_watch(mut self, watch: WatchOptions) -> Self {
        self.watch = watch;
        self
    }

    /// Set the checkout pricing policy
    pub fn with_pricing(mut self, pricing: PricingPolicy) -> Self {
        self.pricing = pricing;
        self
    }

    /// Set the log level and optional log directory
    pub fn with_logging(mut self, level: impl Into<String>, dir: Option<String>) -> Self {
        self.log_level = level.into();
        self.log_dir = dir;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("./bistro-data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Accuracy;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.catalog_base_url, "https://dummyjson.com");
        assert_eq!(config.catalog_category, "groceries");
        assert_eq!(config.timeout, 30);
        assert_eq!(config.watch.interval, Duration::from_secs(2));
        assert_eq!(config.watch.distance_m, 2.0);
        assert_eq!(config.watch.accuracy, Accuracy::Highest);
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("/tmp/bistro")
            .with_catalog_url("http://localhost:9000")
            .with_catalog_category("pizza")
            .with_timeout(5)
            .with_logging("debug", Some("/tmp/logs".to_string()));

        assert_eq!(config.data_dir, PathBuf::from("/tmp/bistro"));
        assert_eq!(config.catalog_base_url, "http://localhost:9000");
        assert_eq!(config.catalog_category, "pizza");
        assert_eq!(config.timeout, 5);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_dir.as_deref(), Some("/tmp/logs"));
    }
}
