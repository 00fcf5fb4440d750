//! Session state: the current user identity and an in-flight flag.
//!
//! A [`Session`] is created at start-up, restored with
//! [`Session::load_from_storage`] and cleared by [`Session::logout`]. State
//! changes are published through a watch channel so a front end can react
//! to them.

use std::sync::Arc;

use log::{debug, info};
use moviebites_model::{LoginRequest, SOCIAL_ID_KEY, UserClaim, extract_social_id};
use serde_json::Value;
use tokio::sync::watch;

use crate::error::{ApiResult, StoreResult};
use crate::identity::IdentityStore;
use crate::resources::UsersApi;
use crate::ApiClient;

/// Point-in-time view of a [`Session`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Signed-in user, `None` while anonymous.
    pub social_id: Option<String>,
    in_flight: usize,
}

impl SessionSnapshot {
    /// True while at least one upsert/login call is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// True once a `social_id` is known.
    pub fn is_authenticated(&self) -> bool {
        self.social_id.is_some()
    }
}

/// Marks the session busy for as long as it lives.
///
/// Released on drop, so early returns, errors and cancelled futures all
/// clear the flag.
struct BusyGuard<'a> {
    state: &'a watch::Sender<SessionSnapshot>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(state: &'a watch::Sender<SessionSnapshot>) -> Self {
        state.send_modify(|snapshot| snapshot.in_flight += 1);
        Self { state }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|snapshot| {
            snapshot.in_flight = snapshot.in_flight.saturating_sub(1)
        });
    }
}

/// Current user identity plus a busy flag for user calls.
#[derive(Debug)]
pub struct Session {
    users: UsersApi,
    store: Arc<dyn IdentityStore>,
    state: watch::Sender<SessionSnapshot>,
}

impl Session {
    /// Anonymous, idle session. Call [`Session::load_from_storage`] to
    /// restore a previous sign-in.
    pub fn new(users: UsersApi, store: Arc<dyn IdentityStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            users,
            store,
            state,
        }
    }

    /// Session sharing the client's identity store.
    pub fn from_client(client: &ApiClient) -> Self {
        Self::new(client.users(), client.store())
    }

    /// Restore the persisted user identity, if any.
    pub async fn load_from_storage(&self) -> StoreResult<Option<String>> {
        let social_id = self
            .store
            .get(SOCIAL_ID_KEY)
            .await?
            .filter(|id| !id.is_empty());
        if social_id.is_some() {
            self.set_social_id(social_id.clone());
        }
        Ok(social_id)
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every identity or busy change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Signed-in user id, if any.
    pub fn social_id(&self) -> Option<String> {
        self.state.borrow().social_id.clone()
    }

    /// See [`SessionSnapshot::is_busy`].
    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    /// Replace the in-memory identity without touching the store.
    pub fn set_social_id(&self, social_id: Option<String>) {
        self.state
            .send_modify(|snapshot| snapshot.social_id = social_id);
    }

    /// Create or update the user and adopt the returned identity.
    ///
    /// Returns the raw response. On failure the normalized error is
    /// propagated and the identity is left as it was.
    pub async fn upsert(&self, claim: &UserClaim) -> ApiResult<Value> {
        let _busy = BusyGuard::acquire(&self.state);
        let response = self.users.upsert(claim).await?;
        self.adopt_identity(&response).await?;
        Ok(response)
    }

    /// Same contract as [`Session::upsert`] against the login endpoint.
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<Value> {
        let _busy = BusyGuard::acquire(&self.state);
        let response = self.users.login(credentials).await?;
        self.adopt_identity(&response).await?;
        Ok(response)
    }

    /// Forget the user identity. The device identifier is kept so the
    /// client falls back to anonymous requests.
    pub async fn logout(&self) -> StoreResult<()> {
        self.store.remove(SOCIAL_ID_KEY).await?;
        self.set_social_id(None);
        info!("[Session] Logged out");
        Ok(())
    }

    async fn adopt_identity(&self, response: &Value) -> StoreResult<()> {
        let Some(social_id) = extract_social_id(response) else {
            debug!("[Session] Response carried no user identifier");
            return Ok(());
        };
        self.store.set(SOCIAL_ID_KEY, &social_id).await?;
        info!("[Session] Authenticated as {}", social_id);
        self.set_social_id(Some(social_id));
        Ok(())
    }
}
