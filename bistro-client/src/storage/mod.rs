//! Persisted key-value store adapter
//!
//! Every store owns one key and writes its full snapshot there as JSON.
//! Backends only deal in strings; encoding lives in [`load_json`] and
//! [`save_json`].

mod file;
mod memory;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};

/// Fixed persistence keys
pub mod keys {
    /// Cart snapshot (JSON array of cart items)
    pub const CART: &str = "cart";
    /// Current order slot
    pub const CURRENT_ORDER: &str = "currentOrder";
    /// Last location snapshot
    pub const LOCATION: &str = "locationData";
    /// Cached bearer token
    pub const SESSION_TOKEN: &str = "session.token";
    /// Cached user id
    pub const SESSION_UID: &str = "session.uid";
}

/// String-keyed, string-valued async storage
#[async_trait]
pub trait KvStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> ClientResult<()>;

    /// Removing an absent key succeeds
    async fn remove(&self, key: &str) -> ClientResult<()>;
}

/// Read and decode a snapshot
///
/// `Ok(None)` when the key is absent, `CorruptState` when it does not decode.
pub async fn load_json<T: DeserializeOwned>(kv: &dyn KvStore, key: &str) -> ClientResult<Option<T>> {
    let Some(raw) = kv.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ClientError::corrupt(key, e))
}

/// Encode and write a snapshot
pub async fn save_json<T: Serialize>(kv: &dyn KvStore, key: &str, value: &T) -> ClientResult<()> {
    let json = serde_json::to_string(value)?;
    kv.set(key, &json).await
}


#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Coordinates;

    #[tokio::test]
    async fn test_load_absent_is_none() {
        let kv = MemoryKvStore::new();
        let loaded: Option<Coordinates> = load_json(&kv, "nothing").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let kv = MemoryKvStore::new();
        let coords = Coordinates::new(41.7151, 44.8271);
        save_json(&kv, "coords", &coords).await.unwrap();

        let loaded: Option<Coordinates> = load_json(&kv, "coords").await.unwrap();
        assert_eq!(loaded, Some(coords));
    }

    #[tokio::test]
    async fn test_load_garbage_is_corrupt_state() {
        let kv = MemoryKvStore::new();
        kv.set("coords", "{not json").await.unwrap();

        let err = load_json::<Coordinates>(&kv, "coords").await.unwrap_err();
        assert!(matches!(err, ClientError::CorruptState { ref key, .. } if key == "coords"));
    }
}
