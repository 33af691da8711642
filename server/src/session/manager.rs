use crate::backend::{AuthSubscription, Backend, BackendError, ErrorKind};
use crate::records::{Booking, Quote};
use crate::session::state::{
    Notification, ProfileUpdate, Session, SessionEvent, SessionManagerConfig, User,
};
use crate::validation::{ValidationErrors, validate_profile};
use dashmap::DashMap;
use metrics::{counter, histogram};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard, RwLock, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Session manager errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Backend(e) => e.kind,
            SessionError::Validation(_) => ErrorKind::Validation,
        }
    }
}

/// Session value plus a revision bumped on every transition
#[derive(Debug, Default)]
struct SessionCell {
    session: Session,
    rev: u64,
}

/// Subscriber list: one channel per registered subscriber
type Subscribers = Arc<DashMap<Uuid, mpsc::UnboundedSender<SessionEvent>>>;

/// Receiving end of a session subscription.
///
/// Dropping it removes the subscriber from the manager's list.
pub struct Subscription {
    id: Uuid,
    receiver: mpsc::UnboundedReceiver<SessionEvent>,
    subscribers: Subscribers,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.subscribers.remove(&self.id);
    }
}

/// Single source of truth for who is signed in.
///
/// Must be created inside a tokio runtime: construction spawns the task that
/// performs the initial session lookup and then follows the backend's
/// out-of-band auth notifications.
pub struct SessionManager {
    backend: Arc<dyn Backend>,
    state: Arc<RwLock<SessionCell>>,
    subscribers: Subscribers,
    ready: watch::Receiver<bool>,
    writer: Option<Mutex<()>>,
    listener: StdMutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_config(backend, SessionManagerConfig::default())
    }

    pub fn with_config(backend: Arc<dyn Backend>, config: SessionManagerConfig) -> Self {
        let state = Arc::new(RwLock::new(SessionCell::default()));
        let subscribers: Subscribers = Arc::new(DashMap::new());
        let (ready_tx, ready) = watch::channel(false);

        // Subscribe before the lookup so no change in between is missed
        let changes = backend.on_auth_state_change();
        let listener = tokio::spawn(follow_backend(
            Arc::clone(&backend),
            changes,
            Arc::clone(&state),
            Arc::clone(&subscribers),
            ready_tx,
        ));

        Self {
            backend,
            state,
            subscribers,
            ready,
            writer: config.serialize_mutations.then(|| Mutex::new(())),
            listener: StdMutex::new(Some(listener)),
        }
    }

    /// Resolves once the initial session lookup has finished
    pub async fn wait_until_ready(&self) {
        let mut ready = self.ready.clone();
        // An Err means the listener is gone, which only happens after shutdown
        let _ = ready.wait_for(|done| *done).await;
    }

    /// True until the initial session lookup has finished
    pub fn is_loading(&self) -> bool {
        !*self.ready.borrow()
    }

    /// Snapshot of the current session
    pub async fn session(&self) -> Session {
        self.state.read().await.session.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.session.user().cloned()
    }

    /// Register a subscriber for session transitions and notifications
    pub fn subscribe(&self) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, receiver) = mpsc::unbounded_channel();
        self.subscribers.insert(id, tx);
        debug!("Session subscriber {} registered", id);
        Subscription {
            id,
            receiver,
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let _guard = self.lock_writer().await;
        let start = Instant::now();
        counter!("unitymedia_auth_sign_in_total").increment(1);

        let result = self.backend.sign_in(email, password).await;
        histogram!("unitymedia_auth_sign_in_duration_seconds").record(start.elapsed());

        match result {
            Ok(user) => {
                info!("User {} signed in", user.id);
                self.set_session(Session::Authenticated(user.clone())).await;
                self.notify(Notification::success("Welcome back!"));
                Ok(user)
            }
            Err(e) => Err(self.fail("sign_in", "Failed to sign in", e.into())),
        }
    }

    /// Create an account with its profile and sign in as it
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<User, SessionError> {
        let _guard = self.lock_writer().await;
        counter!("unitymedia_auth_sign_up_total").increment(1);

        match self.backend.sign_up(email, password, full_name).await {
            Ok(user) => {
                info!("Account {} created", user.id);
                self.set_session(Session::Authenticated(user.clone())).await;
                self.notify(Notification::success("Account created successfully!"));
                Ok(user)
            }
            Err(e) => Err(self.fail("sign_up", "Failed to create account", e.into())),
        }
    }

    /// Sign out. The local session is cleared even when the backend call fails.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let _guard = self.lock_writer().await;
        counter!("unitymedia_auth_sign_out_total").increment(1);

        let result = self.backend.sign_out().await;
        self.set_session(Session::Unauthenticated).await;

        match result {
            Ok(()) => {
                info!("Signed out");
                self.notify(Notification::success("Signed out successfully"));
                Ok(())
            }
            Err(e) => Err(self.fail("sign_out", "Failed to sign out", e.into())),
        }
    }

    /// Ask the backend to send a password reset message. Never touches the session.
    pub async fn reset_password(&self, email: &str) -> Result<(), SessionError> {
        counter!("unitymedia_auth_reset_password_total").increment(1);

        match self.backend.reset_password(email).await {
            Ok(()) => {
                self.notify(Notification::success("Password reset email sent"));
                Ok(())
            }
            Err(e) => Err(self.fail(
                "reset_password",
                "Failed to send reset email",
                e.into(),
            )),
        }
    }

    /// Merge `update` into the signed-in user's profile
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User, SessionError> {
        let _guard = self.lock_writer().await;
        counter!("unitymedia_profile_updates_total").increment(1);

        if let Err(e) = validate_profile(&update) {
            return Err(self.fail("update_profile", "Failed to update profile", e.into()));
        }
        let Some(user) = self.current_user().await else {
            return Err(self.fail(
                "update_profile",
                "Failed to update profile",
                BackendError::not_authenticated().into(),
            ));
        };

        match self.backend.update_profile(user.id, &update).await {
            Ok(profile) => {
                let updated = {
                    let mut guard = self.state.write().await;
                    let cell = &mut *guard;
                    // The user may have changed while the call was in flight
                    let updated = match &mut cell.session {
                        Session::Authenticated(current) if current.id == user.id => {
                            current.profile = profile.clone();
                            Some(current.clone())
                        }
                        _ => None,
                    };
                    if updated.is_some() {
                        cell.rev += 1;
                        self.broadcast(SessionEvent::Changed {
                            session: cell.session.clone(),
                        });
                    }
                    updated
                };
                info!("Profile updated for user {}", user.id);
                self.notify(Notification::success("Profile updated successfully"));
                Ok(updated.unwrap_or(User { profile, ..user }))
            }
            Err(e) => Err(self.fail("update_profile", "Failed to update profile", e.into())),
        }
    }

    /// Bookings of the signed-in user, newest first
    pub async fn bookings(&self) -> Result<Vec<Booking>, SessionError> {
        let user = self.require_user("Failed to fetch bookings").await?;
        self.backend
            .bookings_for(user.id)
            .await
            .map_err(|e| self.fail("bookings", "Failed to fetch bookings", e.into()))
    }

    /// Quotes of the signed-in user, newest first
    pub async fn quotes(&self) -> Result<Vec<Quote>, SessionError> {
        let user = self.require_user("Failed to fetch quotes").await?;
        self.backend
            .quotes_for(user.id)
            .await
            .map_err(|e| self.fail("quotes", "Failed to fetch quotes", e.into()))
    }

    /// Stop following the backend and release its subscription
    pub fn shutdown(&self) {
        let handle = match self.listener.lock() {
            Ok(mut listener) => listener.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
            info!("Session manager shut down");
        }
    }

    async fn require_user(&self, fallback: &str) -> Result<User, SessionError> {
        match self.current_user().await {
            Some(user) => Ok(user),
            None => Err(self.fail(
                "require_user",
                fallback,
                BackendError::not_authenticated().into(),
            )),
        }
    }

    async fn lock_writer(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.writer {
            Some(writer) => Some(writer.lock().await),
            None => None,
        }
    }

    async fn set_session(&self, session: Session) {
        let mut cell = self.state.write().await;
        apply(&mut cell, session, &self.subscribers);
    }

    fn notify(&self, notification: Notification) {
        self.broadcast(SessionEvent::Notice { notification });
    }

    fn broadcast(&self, event: SessionEvent) {
        broadcast(&self.subscribers, event);
    }

    /// Report a failure to subscribers and hand it back to the caller
    fn fail(&self, operation: &str, fallback: &str, error: SessionError) -> SessionError {
        counter!("unitymedia_session_errors_total", "kind" => error.kind().code()).increment(1);
        warn!("{} failed ({}): {}", operation, error.kind().code(), error);

        let message = error.to_string();
        let message = if message.is_empty() {
            fallback.to_string()
        } else {
            message
        };
        self.notify(Notification::error(message));
        error
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Replace the session, bumping the revision and notifying subscribers on change
fn apply(cell: &mut SessionCell, session: Session, subscribers: &Subscribers) -> bool {
    if cell.session == session {
        return false;
    }
    cell.session = session;
    cell.rev += 1;
    broadcast(
        subscribers,
        SessionEvent::Changed {
            session: cell.session.clone(),
        },
    );
    true
}

fn broadcast(subscribers: &Subscribers, event: SessionEvent) {
    subscribers.retain(|_, tx| tx.send(event.clone()).is_ok());
}

/// Initial lookup, then apply out-of-band changes until aborted
async fn follow_backend(
    backend: Arc<dyn Backend>,
    mut changes: AuthSubscription,
    state: Arc<RwLock<SessionCell>>,
    subscribers: Subscribers,
    ready: watch::Sender<bool>,
) {
    let rev_at_start = state.read().await.rev;
    match backend.current_user().await {
        Ok(user) => {
            let mut cell = state.write().await;
            // An operation that completed during the lookup is newer
            if cell.rev == rev_at_start {
                if let Some(user) = &user {
                    info!("Restored session for user {}", user.id);
                }
                apply(&mut cell, Session::from_user(user), &subscribers);
            } else {
                debug!("Discarding initial lookup, session changed meanwhile");
            }
        }
        Err(e) => warn!("Initial session lookup failed: {}", e),
    }
    ready.send_replace(true);

    while let Some(user) = changes.recv().await {
        let mut cell = state.write().await;
        if apply(&mut cell, Session::from_user(user), &subscribers) {
            info!("Session changed out of band");
        }
    }
    debug!("Backend auth notifications closed");
}
