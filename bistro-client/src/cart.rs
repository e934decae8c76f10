//! Cart store
//!
//! Holds the cart snapshot, persists it under [`keys::CART`] after every
//! mutation, and publishes it to subscribers.
//!
//! Mutations are serialized by an async mutex: each one clones the current
//! snapshot, applies the change, persists the result and only then commits
//! it to memory. A failed write leaves memory untouched and is reported
//! both as the return value and through [`CartStore::last_error`].

use std::sync::Arc;

use shared::AppError;
use shared::models::{Cart, CartItem};
use tokio::sync::{Mutex, watch};

use crate::error::{ClientError, ClientResult};
use crate::status::ErrorSlot;
use crate::storage::{KvStore, keys, load_json, save_json};

#[derive(Debug)]
pub struct CartStore {
    kv: Arc<dyn KvStore>,
    state: Mutex<Cart>,
    tx: watch::Sender<Cart>,
    errors: ErrorSlot,
}

impl CartStore {
    /// Create an empty store; call [`hydrate`](Self::hydrate) to restore
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        let (tx, _) = watch::channel(Cart::new());
        Self {
            kv,
            state: Mutex::new(Cart::new()),
            tx,
            errors: ErrorSlot::default(),
        }
    }

    /// Restore the persisted snapshot
    ///
    /// An absent snapshot yields an empty cart. A corrupt one is logged,
    /// recorded in the error field and replaced by an empty cart.
    pub async fn hydrate(&self) -> ClientResult<()> {
        let mut guard = self.state.lock().await;
        let cart = match load_json::<Cart>(self.kv.as_ref(), keys::CART).await {
            Ok(Some(cart)) => {
                self.errors.clear();
                cart
            }
            Ok(None) => {
                self.errors.clear();
                Cart::new()
            }
            Err(e @ ClientError::CorruptState { .. }) => {
                tracing::warn!(error = %e, "Discarding corrupt cart snapshot");
                self.errors.record(&e);
                Cart::new()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load cart");
                self.errors.record(&e);
                return Err(e);
            }
        };

        tracing::debug!(lines = cart.len(), "Cart hydrated");
        *guard = cart.clone();
        self.tx.send_replace(cart);
        Ok(())
    }

    /// Add `quantity` units of `item`
    ///
    /// `item.quantity` is ignored. A zero quantity is a no-op and writes
    /// nothing.
    pub async fn add_item(&self, mut item: CartItem, quantity: u32) -> ClientResult<Cart> {
        if let Err(e) = item.validate() {
            let err = ClientError::from(e);
            self.errors.record(&err);
            return Err(err);
        }
        item.quantity = quantity;
        let item_id = item.id.clone();

        let cart = self.mutate(move |cart| cart.add(item)).await?;
        tracing::debug!(item_id = %item_id, quantity, "Added to cart");
        Ok(cart)
    }

    /// Take `decrement_by` units of `id` out of the cart
    ///
    /// An absent id is a no-op. A line that would reach zero is removed.
    pub async fn remove_item(&self, id: &str, decrement_by: u32) -> ClientResult<Cart> {
        let cart = self.mutate(|cart| cart.remove(id, decrement_by)).await?;
        tracing::debug!(item_id = %id, decrement_by, "Removed from cart");
        Ok(cart)
    }

    /// Empty the cart and persist the empty snapshot
    pub async fn clear(&self) -> ClientResult<()> {
        self.mutate(|cart| {
            cart.clear();
            true
        })
        .await?;
        tracing::info!("Cart cleared");
        Ok(())
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Cart {
        self.tx.borrow().clone()
    }

    /// Σ(price × quantity) over the current snapshot
    pub fn total(&self) -> f64 {
        self.tx.borrow().total()
    }

    /// Receive every committed snapshot
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.tx.subscribe()
    }

    pub fn last_error(&self) -> Option<AppError> {
        self.errors.get()
    }

    /// Apply `change` to a copy, persist it, then commit
    ///
    /// `change` returns `false` when nothing changed; nothing is written then.
    async fn mutate<F>(&self, change: F) -> ClientResult<Cart>
    where
        F: FnOnce(&mut Cart) -> bool,
    {
        let mut guard = self.state.lock().await;
        let mut next = guard.clone();
        if !change(&mut next) {
            return Ok(next);
        }

        if let Err(e) = save_json(self.kv.as_ref(), keys::CART, &next).await {
            tracing::error!(error = %e, "Failed to persist cart, keeping previous snapshot");
            self.errors.record(&e);
            return Err(e);
        }

        *guard = next.clone();
        self.tx.send_replace(next.clone());
        self.errors.clear();
        Ok(next)
    }
}
