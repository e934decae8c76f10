//! Current-order store
//!
//! A single slot under [`keys::CURRENT_ORDER`]: saving replaces whatever was
//! there, clearing removes it. No history is kept.

use std::sync::Arc;

use chrono::Utc;
use shared::AppError;
use shared::models::Order;
use tokio::sync::{Mutex, watch};

use crate::error::{ClientError, ClientResult};
use crate::status::ErrorSlot;
use crate::storage::{KvStore, keys, load_json, save_json};

#[derive(Debug)]
pub struct OrderStore {
    kv: Arc<dyn KvStore>,
    state: Mutex<Option<Order>>,
    tx: watch::Sender<Option<Order>>,
    errors: ErrorSlot,
}

impl OrderStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            kv,
            state: Mutex::new(None),
            tx,
            errors: ErrorSlot::default(),
        }
    }

    /// Restore the persisted slot
    ///
    /// A malformed slot fails with `CorruptState` and leaves the store
    /// empty; the slot itself is left on disk.
    pub async fn load(&self) -> ClientResult<Option<Order>> {
        let mut guard = self.state.lock().await;
        let loaded = match load_json::<Order>(self.kv.as_ref(), keys::CURRENT_ORDER).await {
            Ok(order) => order,
            Err(e) => {
                if matches!(e, ClientError::CorruptState { .. }) {
                    tracing::warn!(error = %e, "Saved order is corrupt, starting without one");
                    *guard = None;
                    self.tx.send_replace(None);
                } else {
                    tracing::error!(error = %e, "Failed to load saved order");
                }
                self.errors.record(&e);
                return Err(e);
            }
        };

        if let Some(order) = &loaded {
            tracing::info!(order_id = %order.id, "Restored current order");
        }
        *guard = loaded.clone();
        self.tx.send_replace(loaded.clone());
        self.errors.clear();
        Ok(loaded)
    }

    /// Stamp `order` with the current time and make it the current order
    ///
    /// Any earlier order is overwritten. Memory is only updated once the
    /// slot has been written.
    pub async fn save(&self, order: Order) -> ClientResult<Order> {
        let mut guard = self.state.lock().await;
        let stamped = order.stamped(Utc::now());

        if let Err(e) = save_json(self.kv.as_ref(), keys::CURRENT_ORDER, &stamped).await {
            tracing::error!(order_id = %stamped.id, error = %e, "Failed to save order");
            self.errors.record(&e);
            return Err(e);
        }

        if let Some(previous) = guard.as_ref().filter(|prev| prev.id != stamped.id) {
            tracing::warn!(
                previous_id = %previous.id,
                order_id = %stamped.id,
                "Replacing current order"
            );
        }
        tracing::info!(order_id = %stamped.id, total = stamped.total, "Order saved");

        *guard = Some(stamped.clone());
        self.tx.send_replace(Some(stamped.clone()));
        self.errors.clear();
        Ok(stamped)
    }

    /// Remove the slot (delivery confirmed)
    pub async fn clear(&self) -> ClientResult<()> {
        let mut guard = self.state.lock().await;
        if let Err(e) = self.kv.remove(keys::CURRENT_ORDER).await {
            tracing::error!(error = %e, "Failed to clear order");
            self.errors.record(&e);
            return Err(e);
        }

        if let Some(order) = guard.take() {
            tracing::info!(order_id = %order.id, "Order cleared");
        }
        self.tx.send_replace(None);
        self.errors.clear();
        Ok(())
    }

    pub fn current(&self) -> Option<Order> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Order>> {
        self.tx.subscribe()
    }

    pub fn last_error(&self) -> Option<AppError> {
        self.errors.get()
    }
}
