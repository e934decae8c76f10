// Fakes shared by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bistro_client::{
    Accuracy, AuthIdentity, ClientError, ClientResult, Coordinates, Fix, FixStream,
    GeocodedAddress, IdentityBackend, LocationProvider, PermissionStatus, ProfileSubscription,
    UserProfile, WatchOptions,
};
use tokio::sync::mpsc;

/// In-memory identity service with email/password accounts
#[derive(Debug, Default)]
pub struct FakeIdentity {
    accounts: Mutex<HashMap<String, (String, String)>>,
    profiles: Mutex<HashMap<String, UserProfile>>,
    listeners: Mutex<HashMap<String, mpsc::Sender<ClientResult<UserProfile>>>>,
    revoked: Mutex<Vec<String>>,
    next_uid: AtomicUsize,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a profile document and push it to its listener
    pub async fn update_profile(&self, profile: UserProfile) -> bool {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.uid.clone(), profile.clone());
        let listener = self.listeners.lock().unwrap().get(&profile.uid).cloned();
        match listener {
            Some(tx) => tx.send(Ok(profile)).await.is_ok(),
            None => false,
        }
    }

    pub fn profile(&self, uid: &str) -> Option<UserProfile> {
        self.profiles.lock().unwrap().get(uid).cloned()
    }

    pub fn revoke(&self, token: &str) {
        self.revoked.lock().unwrap().push(token.to_string());
    }
}

#[async_trait]
impl IdentityBackend for FakeIdentity {
    async fn create_account(&self, email: &str, password: &str) -> ClientResult<AuthIdentity> {
        if password.len() < 6 {
            return Err(ClientError::WeakCredential(
                "password should be at least 6 characters".to_string(),
            ));
        }
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(ClientError::AccountExists);
        }
        let n = self.next_uid.fetch_add(1, Ordering::SeqCst);
        let uid = format!("uid-{}", n);
        accounts.insert(email.to_string(), (password.to_string(), uid.clone()));
        Ok(AuthIdentity {
            token: format!("token-{}", uid),
            uid,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<AuthIdentity> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((stored, uid)) if stored == password => Ok(AuthIdentity {
                uid: uid.clone(),
                token: format!("token-{}", uid),
            }),
            _ => Err(ClientError::InvalidCredential),
        }
    }

    async fn sign_out(&self, token: &str) -> ClientResult<()> {
        self.revoke(token);
        Ok(())
    }

    async fn write_profile(&self, profile: &UserProfile) -> ClientResult<()> {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.uid.clone(), profile.clone());
        Ok(())
    }

    async fn subscribe_profile(&self, uid: &str) -> ClientResult<ProfileSubscription> {
        let (tx, rx) = mpsc::channel(16);
        if let Some(profile) = self.profile(uid) {
            let _ = tx.try_send(Ok(profile));
        }
        self.listeners.lock().unwrap().insert(uid.to_string(), tx);
        Ok(ProfileSubscription::new(rx))
    }

    async fn validate_session(&self, uid: &str, token: &str) -> ClientResult<bool> {
        let revoked = self.revoked.lock().unwrap().iter().any(|t| t == token);
        Ok(!revoked && token == format!("token-{}", uid))
    }
}

/// Scripted device location
#[derive(Debug)]
pub struct FakeLocation {
    pub permission: Mutex<PermissionStatus>,
    pub grant_on_request: bool,
    pub fix: Mutex<Coordinates>,
    pub geocode_ok: bool,
    pub watch_calls: AtomicUsize,
    feed: Mutex<Option<mpsc::Sender<ClientResult<Fix>>>>,
}

impl FakeLocation {
    pub fn granted(fix: Coordinates) -> Self {
        Self {
            permission: Mutex::new(PermissionStatus::Granted),
            grant_on_request: true,
            fix: Mutex::new(fix),
            geocode_ok: true,
            watch_calls: AtomicUsize::new(0),
            feed: Mutex::new(None),
        }
    }

    pub fn denying(fix: Coordinates) -> Self {
        Self {
            permission: Mutex::new(PermissionStatus::Undetermined),
            grant_on_request: false,
            ..Self::granted(fix)
        }
    }

    pub fn move_to(&self, coordinates: Coordinates) {
        *self.fix.lock().unwrap() = coordinates;
    }

    /// Deliver a fix to the running watch
    pub async fn push(&self, coordinates: Coordinates) -> bool {
        let feed = self.feed.lock().unwrap().clone();
        match feed {
            Some(tx) => tx.send(Ok(Fix::new(coordinates))).await.is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl LocationProvider for FakeLocation {
    async fn permission_status(&self) -> ClientResult<PermissionStatus> {
        Ok(*self.permission.lock().unwrap())
    }

    async fn request_permission(&self) -> ClientResult<PermissionStatus> {
        let status = if self.grant_on_request {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        *self.permission.lock().unwrap() = status;
        Ok(status)
    }

    async fn services_enabled(&self) -> ClientResult<bool> {
        Ok(true)
    }

    async fn current_fix(&self, _accuracy: Accuracy) -> ClientResult<Fix> {
        Ok(Fix::new(*self.fix.lock().unwrap()))
    }

    async fn watch_position(&self, _options: &WatchOptions) -> ClientResult<FixStream> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(16);
        *self.feed.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
    ) -> ClientResult<Vec<GeocodedAddress>> {
        if !self.geocode_ok {
            return Err(ClientError::GeocodeUnavailable("offline".to_string()));
        }
        Ok(vec![GeocodedAddress {
            city: Some("Tbilisi".to_string()),
            street: Some(format!(
                "{:.3},{:.3}",
                coordinates.latitude, coordinates.longitude
            )),
        }])
    }
}
