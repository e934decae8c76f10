//! Location store
//!
//! Owns the last known fix and its address, persisted under
//! [`keys::LOCATION`]. Fixes come from a one-shot request or from a watch
//! subscription served by a background task. A fix whose coordinates equal
//! the stored ones is dropped before geocoding, so nothing is written.

mod provider;

pub use provider::{Accuracy, Fix, FixStream, LocationProvider, PermissionStatus, WatchOptions};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use shared::AppError;
use shared::models::{Coordinates, LocationSnapshot};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, ClientResult};
use crate::status::ErrorSlot;
use crate::storage::{KvStore, keys, load_json, save_json};

/// City used when the address has none
pub const UNKNOWN_CITY: &str = "Unknown City";

#[derive(Debug)]
pub struct LocationStore {
    inner: Arc<Inner>,
    watch_options: WatchOptions,
    watcher: Mutex<Option<Watcher>>,
}

#[derive(Debug)]
struct Inner {
    kv: Arc<dyn KvStore>,
    provider: Arc<dyn LocationProvider>,
    state: Mutex<Option<LocationSnapshot>>,
    tx: watch::Sender<Option<LocationSnapshot>>,
    permission_granted: AtomicBool,
    services_enabled: AtomicBool,
    errors: ErrorSlot,
}

#[derive(Debug)]
struct Watcher {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl LocationStore {
    pub fn new(
        kv: Arc<dyn KvStore>,
        provider: Arc<dyn LocationProvider>,
        watch_options: WatchOptions,
    ) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                kv,
                provider,
                state: Mutex::new(None),
                tx,
                permission_granted: AtomicBool::new(false),
                services_enabled: AtomicBool::new(false),
                errors: ErrorSlot::default(),
            }),
            watch_options,
            watcher: Mutex::new(None),
        }
    }

    /// Restore the last persisted snapshot
    pub async fn hydrate(&self) -> ClientResult<()> {
        let mut guard = self.inner.state.lock().await;
        let snapshot =
            match load_json::<LocationSnapshot>(self.inner.kv.as_ref(), keys::LOCATION).await {
                Ok(snapshot) => {
                    self.inner.errors.clear();
                    snapshot
                }
                Err(e @ ClientError::CorruptState { .. }) => {
                    tracing::warn!(error = %e, "Discarding corrupt location snapshot");
                    self.inner.errors.record(&e);
                    None
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load location");
                    self.inner.errors.record(&e);
                    return Err(e);
                }
            };

        *guard = snapshot.clone();
        self.inner.tx.send_replace(snapshot);
        Ok(())
    }

    /// Take one high-accuracy fix and store it with its address
    ///
    /// Prompts for permission first when needed. A refusal fails with
    /// `PermissionDenied` and leaves state and storage untouched.
    pub async fn request_once(&self) -> ClientResult<LocationSnapshot> {
        self.ensure_permission().await?;

        let fix = match self.inner.provider.current_fix(Accuracy::Highest).await {
            Ok(fix) => fix,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get current position");
                self.inner.errors.record(&e);
                return Err(e);
            }
        };

        self.inner.apply_fix(fix.coordinates).await
    }

    /// Start continuous tracking
    ///
    /// Calling it while a watch is running does nothing.
    pub async fn start_watch(&self) -> ClientResult<()> {
        let mut watcher = self.watcher.lock().await;
        if watcher.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            tracing::debug!("Location watch already running");
            return Ok(());
        }

        self.ensure_permission().await?;

        let mut fixes = match self.inner.provider.watch_position(&self.watch_options).await {
            Ok(rx) => rx,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to start location watch");
                self.inner.errors.record(&e);
                return Err(e);
            }
        };

        let token = CancellationToken::new();
        let inner = self.inner.clone();
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    next = fixes.recv() => match next {
                        Some(Ok(fix)) => {
                            // Failures are logged and recorded by apply_fix
                            let _ = inner.apply_fix(fix.coordinates).await;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Location watch update failed");
                            inner.errors.record(&e);
                        }
                        None => {
                            tracing::debug!("Location provider closed the watch");
                            break;
                        }
                    },
                }
            }
        });

        tracing::info!(
            accuracy = %self.watch_options.accuracy,
            interval_ms = self.watch_options.interval.as_millis() as u64,
            distance_m = self.watch_options.distance_m,
            "Location watch started"
        );
        *watcher = Some(Watcher { token, handle });
        Ok(())
    }

    /// Stop continuous tracking; a no-op when not watching
    pub async fn stop_watch(&self) {
        let Some(watcher) = self.watcher.lock().await.take() else {
            return;
        };
        watcher.token.cancel();
        if let Err(e) = watcher.handle.await {
            tracing::warn!(error = %e, "Location watch task ended abnormally");
        }
        tracing::info!("Location watch stopped");
    }

    pub async fn is_watching(&self) -> bool {
        self.watcher
            .lock()
            .await
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Query and record whether location services are on
    pub async fn check_services_enabled(&self) -> ClientResult<bool> {
        match self.inner.provider.services_enabled().await {
            Ok(enabled) => {
                self.inner.services_enabled.store(enabled, Ordering::Relaxed);
                if !enabled {
                    tracing::info!("Location services are disabled");
                }
                Ok(enabled)
            }
            Err(e) => {
                self.inner.errors.record(&e);
                Err(e)
            }
        }
    }

    /// Query and record the permission without prompting
    pub async fn check_permission(&self) -> ClientResult<PermissionStatus> {
        match self.inner.provider.permission_status().await {
            Ok(status) => {
                self.inner
                    .permission_granted
                    .store(status.is_granted(), Ordering::Relaxed);
                Ok(status)
            }
            Err(e) => {
                self.inner.errors.record(&e);
                Err(e)
            }
        }
    }

    pub fn permission_granted(&self) -> bool {
        self.inner.permission_granted.load(Ordering::Relaxed)
    }

    pub fn services_enabled(&self) -> bool {
        self.inner.services_enabled.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> Option<LocationSnapshot> {
        self.inner.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<LocationSnapshot>> {
        self.inner.tx.subscribe()
    }

    pub fn last_error(&self) -> Option<AppError> {
        self.inner.errors.get()
    }

    async fn ensure_permission(&self) -> ClientResult<()> {
        let provider = &self.inner.provider;
        let mut status = self.check_permission().await?;
        if !status.is_granted() {
            status = match provider.request_permission().await {
                Ok(status) => status,
                Err(e) => {
                    self.inner.errors.record(&e);
                    return Err(e);
                }
            };
        }

        self.inner
            .permission_granted
            .store(status.is_granted(), Ordering::Relaxed);
        if status.is_granted() {
            return Ok(());
        }

        tracing::info!(status = ?status, "Location permission refused");
        let err = ClientError::PermissionDenied;
        self.inner.errors.record(&err);
        Err(err)
    }
}

impl Drop for LocationStore {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.get_mut().take() {
            watcher.token.cancel();
        }
    }
}

impl Inner {
    /// Geocode, persist and publish a fix unless it repeats the stored one
    ///
    /// Returns the snapshot in effect afterwards.
    async fn apply_fix(&self, coordinates: Coordinates) -> ClientResult<LocationSnapshot> {
        let mut guard = self.state.lock().await;
        if let Some(current) = guard.as_ref().filter(|s| s.coordinates == coordinates) {
            tracing::trace!("Ignoring repeated fix");
            return Ok(current.clone());
        }

        let (city, street, geocode_error) = self.lookup_address(coordinates).await;
        let snapshot = LocationSnapshot {
            coordinates,
            city,
            street,
        };

        if let Err(e) = save_json(self.kv.as_ref(), keys::LOCATION, &snapshot).await {
            tracing::error!(error = %e, "Failed to persist location, keeping previous fix");
            self.errors.record(&e);
            return Err(e);
        }

        tracing::debug!(
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            city = %snapshot.city,
            "Location updated"
        );
        *guard = Some(snapshot.clone());
        self.tx.send_replace(Some(snapshot.clone()));
        match geocode_error {
            Some(e) => self.errors.record(&e),
            None => self.errors.clear(),
        }
        Ok(snapshot)
    }

    /// City and street for `coordinates`
    ///
    /// Blank strings plus the error when the lookup fails or finds nothing.
    async fn lookup_address(
        &self,
        coordinates: Coordinates,
    ) -> (String, String, Option<ClientError>) {
        let err = match self.provider.reverse_geocode(coordinates).await {
            Ok(addresses) => match addresses.into_iter().next() {
                Some(address) => {
                    let city = address
                        .city
                        .filter(|c| !c.trim().is_empty())
                        .unwrap_or_else(|| UNKNOWN_CITY.to_string());
                    return (city, address.street.unwrap_or_default(), None);
                }
                None => ClientError::GeocodeUnavailable("no address found".to_string()),
            },
            Err(e @ ClientError::GeocodeUnavailable(_)) => e,
            Err(e) => ClientError::GeocodeUnavailable(e.to_string()),
        };

        tracing::warn!(error = %err, "Reverse geocoding failed, keeping bare coordinates");
        (String::new(), String::new(), Some(err))
    }
}
