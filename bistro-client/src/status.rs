//! Per-store error field

use std::sync::RwLock;

use shared::AppError;

use crate::error::ClientError;

/// Most recent failure of a store, cleared by the next success
///
/// Store operations return their errors as well; this is the copy the UI
/// reads when it re-renders.
#[derive(Debug, Default)]
pub(crate) struct ErrorSlot {
    inner: RwLock<Option<AppError>>,
}

impl ErrorSlot {
    pub(crate) fn record(&self, err: &ClientError) {
        if let Ok(mut slot) = self.inner.write() {
            *slot = Some(err.to_app_error());
        }
    }

    pub(crate) fn clear(&self) {
        if let Ok(mut slot) = self.inner.write() {
            *slot = None;
        }
    }

    pub(crate) fn get(&self) -> Option<AppError> {
        self.inner.read().ok().and_then(|slot| slot.clone())
    }
}
