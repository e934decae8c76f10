//! Bistro Client - state layer of the food-ordering app
//!
//! Cart, current order, device location and auth session, each an explicit
//! store over an injected key-value store, plus the read-only catalog.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod client;
pub mod config;
pub mod error;
pub mod location;
pub mod logger;
pub mod order;
mod status;
pub mod storage;

pub use auth::{
    AuthIdentity, AuthSession, AuthStatus, IdentityBackend, ProfileSubscription, SessionData,
};
pub use cart::CartStore;
pub use catalog::{CatalogClient, RawProduct};
pub use checkout::{Checkout, OrderQuote, Payment, PaymentMethod, PricingPolicy};
pub use client::BistroClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use location::{
    Accuracy, Fix, FixStream, LocationProvider, LocationStore, PermissionStatus, WatchOptions,
};
pub use order::OrderStore;
pub use storage::{FileKvStore, KvStore, MemoryKvStore};

// Re-export shared types for convenience
pub use shared::models::{
    Cart, CartItem, Coordinates, GeocodedAddress, LocationSnapshot, Order, OrderAddress,
    OrderLine, Product, UserProfile,
};
