//! Backing-service trait definitions

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::types::BackendError;
use crate::records::{Booking, NewBooking, NewQuote, Quote};
use crate::session::{Profile, ProfileUpdate, User};

/// Registry of auth-state listeners, keyed by subscription id
pub type AuthListeners = Arc<DashMap<Uuid, mpsc::UnboundedSender<Option<User>>>>;

/// Handle on a backend's auth-state notifications.
///
/// Dropping the handle releases the subscription.
pub struct AuthSubscription {
    id: Uuid,
    receiver: mpsc::UnboundedReceiver<Option<User>>,
    listeners: AuthListeners,
}

impl AuthSubscription {
    /// Register a new listener in `listeners`
    pub fn register(listeners: &AuthListeners) -> Self {
        let id = Uuid::new_v4();
        let (tx, receiver) = mpsc::unbounded_channel();
        listeners.insert(id, tx);
        Self {
            id,
            receiver,
            listeners: Arc::clone(listeners),
        }
    }

    /// Wait for the next change. `Some(None)` means signed out.
    pub async fn recv(&mut self) -> Option<Option<User>> {
        self.receiver.recv().await
    }

    /// Next change if one is already queued
    pub fn try_recv(&mut self) -> Option<Option<User>> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.listeners.remove(&self.id);
    }
}

/// Deliver a change to every live listener, pruning closed ones
pub fn notify_listeners(listeners: &AuthListeners, user: Option<User>) {
    listeners.retain(|_, tx| tx.send(user.clone()).is_ok());
}

/// Hosted authentication API
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Look up the user of any previously issued session
    async fn current_user(&self) -> Result<Option<User>, BackendError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, BackendError>;

    /// Create the account and its profile
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<User, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Dispatch a password reset message
    async fn reset_password(&self, email: &str) -> Result<(), BackendError>;

    /// Merge `update` into the stored profile and return the result
    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Profile, BackendError>;

    /// Subscribe to session changes that originate outside this client's
    /// own calls (expiry, sign-out elsewhere)
    fn on_auth_state_change(&self) -> AuthSubscription;
}

/// Row-level access to the `bookings` and `quotes` tables
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Bookings for a user, newest first
    async fn bookings_for(&self, user_id: Uuid) -> Result<Vec<Booking>, BackendError>;

    /// Quotes for a user, newest first
    async fn quotes_for(&self, user_id: Uuid) -> Result<Vec<Quote>, BackendError>;

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, BackendError>;

    async fn insert_quote(&self, quote: NewQuote) -> Result<Quote, BackendError>;
}

/// A complete backing service
pub trait Backend: AuthBackend + RecordStore {}

impl<T: AuthBackend + RecordStore> Backend for T {}
