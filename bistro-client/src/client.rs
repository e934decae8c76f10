//! Client aggregate
//!
//! Wires every store to one shared key-value store and the injected
//! backends. Nothing here is global: build as many clients as you like,
//! each over its own storage.

use std::sync::Arc;

use crate::auth::{AuthSession, IdentityBackend};
use crate::cart::CartStore;
use crate::catalog::CatalogClient;
use crate::checkout::Checkout;
use crate::location::{LocationProvider, LocationStore};
use crate::order::OrderStore;
use crate::storage::{FileKvStore, KvStore};
use crate::{ClientConfig, ClientError, ClientResult};

/// Everything the app screens talk to
///
/// # Example
///
/// ```no_run
/// # async fn run(
/// #     identity: std::sync::Arc<dyn bistro_client::IdentityBackend>,
/// #     location: std::sync::Arc<dyn bistro_client::LocationProvider>,
/// # ) -> bistro_client::ClientResult<()> {
/// use bistro_client::{BistroClient, ClientConfig};
///
/// let client = BistroClient::open(ClientConfig::from_env(), identity, location).await?;
/// client.hydrate().await;
/// let menu = client.catalog().list_products().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BistroClient {
    config: ClientConfig,
    kv: Arc<dyn KvStore>,
    cart: Arc<CartStore>,
    orders: Arc<OrderStore>,
    location: LocationStore,
    auth: AuthSession,
    catalog: CatalogClient,
    checkout: Checkout,
}

impl BistroClient {
    pub fn new(
        config: ClientConfig,
        kv: Arc<dyn KvStore>,
        identity: Arc<dyn IdentityBackend>,
        location: Arc<dyn LocationProvider>,
    ) -> ClientResult<Self> {
        let catalog = CatalogClient::new(&config)?;
        let cart = Arc::new(CartStore::new(kv.clone()));
        let orders = Arc::new(OrderStore::new(kv.clone()));
        let checkout = Checkout::new(cart.clone(), orders.clone(), config.pricing.clone());
        let location = LocationStore::new(kv.clone(), location, config.watch.clone());
        let auth = AuthSession::new(kv.clone(), identity);

        Ok(Self {
            config,
            kv,
            cart,
            orders,
            location,
            auth,
            catalog,
            checkout,
        })
    }

    /// Build over a [`FileKvStore`] in `config.data_dir`
    pub async fn open(
        config: ClientConfig,
        identity: Arc<dyn IdentityBackend>,
        location: Arc<dyn LocationProvider>,
    ) -> ClientResult<Self> {
        let kv = FileKvStore::new(config.data_dir.clone());
        kv.ensure_dir()
            .await
            .map_err(|e| ClientError::persistence("data_dir", e))?;
        tracing::info!(data_dir = %config.data_dir.display(), "Opened data directory");
        Self::new(config, Arc::new(kv), identity, location)
    }

    /// Restore every store from storage
    ///
    /// Failures are logged and left in each store's `last_error`; a store
    /// that cannot load starts empty.
    pub async fn hydrate(&self) {
        if let Err(e) = self.cart.hydrate().await {
            tracing::warn!(error = %e, "Cart not restored");
        }
        if let Err(e) = self.orders.load().await {
            tracing::warn!(error = %e, "Current order not restored");
        }
        if let Err(e) = self.location.hydrate().await {
            tracing::warn!(error = %e, "Location not restored");
        }
        match self.auth.restore().await {
            Ok(status) => tracing::info!(status = %status, "Client hydrated"),
            Err(e) => tracing::warn!(error = %e, "Session not restored"),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn kv(&self) -> &Arc<dyn KvStore> {
        &self.kv
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn orders(&self) -> &OrderStore {
        &self.orders
    }

    pub fn location(&self) -> &LocationStore {
        &self.location
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn checkout(&self) -> &Checkout {
        &self.checkout
    }
}
