//! Data models
//!
//! Snapshots persisted by the client stores and the validated catalog
//! product. Persisted shapes use camelCase keys.

pub mod cart;
pub mod location;
pub mod order;
pub mod product;
pub mod user;

// Re-exports
pub use cart::*;
pub use location::*;
pub use order::*;
pub use product::*;
pub use user::*;
