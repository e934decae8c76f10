//! Auth session
//!
//! Holds the cached projection of the signed-in user. The token and uid are
//! cached in the key-value store so a restart can restore the session
//! optimistically before the backend confirms it. Profile changes arrive as
//! pushes and are applied by a single forwarding task, cancelled whenever the
//! session ends or is replaced.

mod backend;

pub use backend::{AuthIdentity, IdentityBackend, ProfileSubscription};

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use shared::AppError;
use shared::models::UserProfile;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, ClientResult};
use crate::status::ErrorSlot;
use crate::storage::{KvStore, keys};

/// Session lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStatus {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated,
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStatus::Unauthenticated => write!(f, "Unauthenticated"),
            AuthStatus::Authenticating => write!(f, "Authenticating"),
            AuthStatus::Authenticated => write!(f, "Authenticated"),
        }
    }
}

/// Session state published to subscribers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionData {
    pub status: AuthStatus,
    pub token: Option<String>,
    pub uid: Option<String>,
    /// Filled by profile pushes; may lag behind `uid`
    pub user: Option<UserProfile>,
}

impl SessionData {
    fn authenticated(identity: AuthIdentity, user: Option<UserProfile>) -> Self {
        Self {
            status: AuthStatus::Authenticated,
            token: Some(identity.token),
            uid: Some(identity.uid),
            user,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }
}

#[derive(Debug)]
struct ProfileFeed {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
pub struct AuthSession {
    kv: Arc<dyn KvStore>,
    backend: Arc<dyn IdentityBackend>,
    /// Serializes register/login/logout/reconcile
    ops: Mutex<()>,
    tx: Arc<watch::Sender<SessionData>>,
    feed: std::sync::Mutex<Option<ProfileFeed>>,
    errors: Arc<ErrorSlot>,
}

impl AuthSession {
    pub fn new(kv: Arc<dyn KvStore>, backend: Arc<dyn IdentityBackend>) -> Self {
        let (tx, _) = watch::channel(SessionData::default());
        Self {
            kv,
            backend,
            ops: Mutex::new(()),
            tx: Arc::new(tx),
            feed: std::sync::Mutex::new(None),
            errors: Arc::new(ErrorSlot::default()),
        }
    }

    /// Create an account, write its profile document and sign in
    ///
    /// On failure the session reverts to its state before the call.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<SessionData> {
        let username = username.trim();
        if username.is_empty() {
            return Err(self.fail(ClientError::Validation("username is required".to_string())));
        }

        let _op = self.ops.lock().await;
        let previous = self.session();
        self.set_status(AuthStatus::Authenticating);

        let identity = match self.backend.create_account(email, password).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "Registration rejected");
                self.tx.send_replace(previous);
                return Err(self.fail(e));
            }
        };

        let profile = UserProfile {
            uid: identity.uid.clone(),
            username: username.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.backend.write_profile(&profile).await {
            tracing::error!(uid = %identity.uid, error = %e, "Failed to write profile document");
            self.tx.send_replace(previous);
            return Err(self.fail(e));
        }

        tracing::info!(uid = %identity.uid, "Account registered");
        Ok(self.establish(identity, Some(profile)).await)
    }

    /// Sign in with email and password
    ///
    /// A rejected attempt leaves the session as it was before the call.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<SessionData> {
        let _op = self.ops.lock().await;
        let previous = self.session();
        self.set_status(AuthStatus::Authenticating);

        match self.backend.sign_in(email, password).await {
            Ok(identity) => {
                tracing::info!(uid = %identity.uid, "Signed in");
                Ok(self.establish(identity, None).await)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sign-in rejected");
                self.tx.send_replace(previous);
                Err(self.fail(e))
            }
        }
    }

    /// End the session
    ///
    /// Local state is always cleared, even when the remote sign-out fails.
    /// Only a failure to drop the cached credentials is returned.
    pub async fn logout(&self) -> ClientResult<()> {
        let _op = self.ops.lock().await;
        self.stop_profile_feed();

        let previous = self.session();
        if let Some(token) = previous.token() {
            if let Err(e) = self.backend.sign_out(token).await {
                tracing::warn!(error = %e, "Remote sign-out failed, clearing local session anyway");
            }
        }

        self.tx.send_replace(SessionData::default());
        let result = self.forget_credentials().await;
        match &result {
            Ok(()) => self.errors.clear(),
            Err(e) => self.errors.record(e),
        }
        tracing::info!(uid = ?previous.uid, "Signed out");
        result
    }

    /// Optimistic startup state from the cached token and uid
    ///
    /// No backend call is made; see [`reconcile`](Self::reconcile).
    pub async fn restore(&self) -> ClientResult<AuthStatus> {
        let _op = self.ops.lock().await;
        let token = self.read_cached(keys::SESSION_TOKEN).await?;
        let uid = self.read_cached(keys::SESSION_UID).await?;

        let session = match (token, uid) {
            (Some(token), Some(uid)) => {
                tracing::info!(uid = %uid, "Restored cached session");
                SessionData::authenticated(AuthIdentity { uid, token }, None)
            }
            _ => SessionData::default(),
        };
        let status = session.status;
        self.tx.send_replace(session);
        Ok(status)
    }

    /// Confirm the restored session with the backend
    ///
    /// A rejected session is cleared. A backend failure keeps the optimistic
    /// state and is returned.
    pub async fn reconcile(&self) -> ClientResult<AuthStatus> {
        let _op = self.ops.lock().await;
        let session = self.session();
        let (Some(uid), Some(token)) = (session.uid.clone(), session.token.clone()) else {
            return Ok(AuthStatus::Unauthenticated);
        };

        match self.backend.validate_session(&uid, &token).await {
            Ok(true) => {
                self.start_profile_feed(&uid).await;
                Ok(AuthStatus::Authenticated)
            }
            Ok(false) => {
                tracing::info!(uid = %uid, "Cached session rejected, signing out locally");
                self.stop_profile_feed();
                self.tx.send_replace(SessionData::default());
                self.forget_credentials().await.map_err(|e| self.fail(e))?;
                Ok(AuthStatus::Unauthenticated)
            }
            Err(e) => {
                tracing::warn!(uid = %uid, error = %e, "Could not confirm cached session");
                Err(self.fail(e))
            }
        }
    }

    pub fn session(&self) -> SessionData {
        self.tx.borrow().clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.tx.borrow().status
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.tx.borrow().user.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionData> {
        self.tx.subscribe()
    }

    pub fn last_error(&self) -> Option<AppError> {
        self.errors.get()
    }

    async fn establish(&self, identity: AuthIdentity, user: Option<UserProfile>) -> SessionData {
        let uid = identity.uid.clone();
        if let Err(e) = self.cache_credentials(&identity).await {
            // Session stays usable for this run; only restart restore is lost
            tracing::warn!(uid = %uid, error = %e, "Failed to cache session");
            self.errors.record(&e);
        } else {
            self.errors.clear();
        }

        let session = SessionData::authenticated(identity, user);
        self.tx.send_replace(session.clone());
        self.start_profile_feed(&uid).await;
        session
    }

    /// Replace the forwarding task with one for `uid`
    async fn start_profile_feed(&self, uid: &str) {
        self.stop_profile_feed();

        let mut subscription = match self.backend.subscribe_profile(uid).await {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::warn!(uid = %uid, error = %e, "Profile subscription failed");
                self.errors.record(&e);
                return;
            }
        };

        let token = CancellationToken::new();
        let task_token = token.clone();
        let tx = self.tx.clone();
        let errors = self.errors.clone();
        let owner = uid.to_string();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    next = subscription.recv() => match next {
                        Some(Ok(profile)) => {
                            tx.send_if_modified(|session| {
                                if session.uid.as_deref() != Some(owner.as_str()) {
                                    return false;
                                }
                                session.user = Some(profile);
                                true
                            });
                        }
                        Some(Err(e)) => {
                            tracing::warn!(uid = %owner, error = %e, "Profile push failed");
                            errors.record(&e);
                        }
                        None => break,
                    },
                }
            }
            tracing::debug!(uid = %owner, "Profile feed ended");
        });

        if let Ok(mut feed) = self.feed.lock() {
            *feed = Some(ProfileFeed { token, handle });
        }
    }

    fn stop_profile_feed(&self) {
        let previous = match self.feed.lock() {
            Ok(mut feed) => feed.take(),
            Err(_) => None,
        };
        if let Some(feed) = previous {
            feed.token.cancel();
            feed.handle.abort();
        }
    }

    fn set_status(&self, status: AuthStatus) {
        self.tx.send_modify(|session| session.status = status);
    }

    async fn cache_credentials(&self, identity: &AuthIdentity) -> ClientResult<()> {
        self.kv.set(keys::SESSION_TOKEN, &identity.token).await?;
        self.kv.set(keys::SESSION_UID, &identity.uid).await
    }

    async fn forget_credentials(&self) -> ClientResult<()> {
        self.kv.remove(keys::SESSION_TOKEN).await?;
        self.kv.remove(keys::SESSION_UID).await
    }

    async fn read_cached(&self, key: &str) -> ClientResult<Option<String>> {
        match self.kv.get(key).await {
            Ok(value) => Ok(value.filter(|v| !v.is_empty())),
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to read cached session");
                Err(self.fail(e))
            }
        }
    }

    fn fail(&self, err: ClientError) -> ClientError {
        self.errors.record(&err);
        err
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        self.stop_profile_feed();
    }
}
