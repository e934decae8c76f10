//! File-backed key-value store - one JSON file per key

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::KvStore;
use crate::error::{ClientError, ClientResult};

/// Key-value store rooted at a data directory
///
/// Writes go to a temporary sibling and are renamed into place, so a reader
/// never sees a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Ensure the data directory exists
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that backs `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Keep `[A-Za-z0-9._-]`, replace everything else with `_`
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::persistence(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.ensure_dir()
            .await
            .map_err(|e| ClientError::persistence(key, e))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .await
            .map_err(|e| ClientError::persistence(key, e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| ClientError::persistence(key, e))?;

        tracing::trace!(key = %key, path = %path.display(), "Snapshot written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::persistence(key, e)),
        }
    }
}
