//! Identity and profile-document backend

use async_trait::async_trait;
use shared::models::UserProfile;
use tokio::sync::mpsc;

use crate::error::ClientResult;

/// Result of a successful sign-up or sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub uid: String,
    /// Bearer token
    pub token: String,
}

/// Push feed of one user's profile document
///
/// Dropping it unregisters the listener on the backend side.
#[derive(Debug)]
pub struct ProfileSubscription {
    rx: mpsc::Receiver<ClientResult<UserProfile>>,
}

impl ProfileSubscription {
    pub fn new(rx: mpsc::Receiver<ClientResult<UserProfile>>) -> Self {
        Self { rx }
    }

    /// Next pushed document; `None` once the backend closes the feed
    pub async fn recv(&mut self) -> Option<ClientResult<UserProfile>> {
        self.rx.recv().await
    }
}

#[async_trait]
pub trait IdentityBackend: Send + Sync + std::fmt::Debug {
    /// `AccountExists` or `WeakCredential` on rejection
    async fn create_account(&self, email: &str, password: &str) -> ClientResult<AuthIdentity>;

    /// `InvalidCredential` or `RateLimited` on rejection
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<AuthIdentity>;

    async fn sign_out(&self, token: &str) -> ClientResult<()>;

    /// Write the profile document keyed by `profile.uid`
    async fn write_profile(&self, profile: &UserProfile) -> ClientResult<()>;

    /// Subscribe to the profile document; the current value is pushed first
    async fn subscribe_profile(&self, uid: &str) -> ClientResult<ProfileSubscription>;

    /// Whether a cached session is still accepted
    async fn validate_session(&self, uid: &str, token: &str) -> ClientResult<bool>;
}
