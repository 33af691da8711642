//! In-process backing service used by tests and demo mode

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::service::{
    AuthBackend, AuthListeners, AuthSubscription, RecordStore, notify_listeners,
};
use super::types::BackendError;
use crate::records::{
    Booking, BookingStatus, NewBooking, NewQuote, Quote, QuoteStatus, newest_first,
};
use crate::session::{Profile, ProfileUpdate, Role, User};
use crate::validation::MIN_PASSWORD_LEN;

/// Demo account seeded by `with_demo_data`
pub const DEMO_EMAIL: &str = "demo@unitymedia.ae";
pub const DEMO_PASSWORD: &str = "demo1234";

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct Tables {
    /// Accounts keyed by lower-cased email
    accounts: HashMap<String, Account>,
    /// User of the currently issued session
    current: Option<Uuid>,
    bookings: Vec<Booking>,
    quotes: Vec<Quote>,
    /// Emails a reset message was dispatched to
    reset_requests: Vec<String>,
}

impl Tables {
    fn account_by_id(&mut self, id: Uuid) -> Option<&mut Account> {
        self.accounts.values_mut().find(|a| a.user.id == id)
    }
}

/// In-memory backing service
pub struct InMemoryBackend {
    tables: RwLock<Tables>,
    listeners: AuthListeners,
    offline: AtomicBool,
    /// Artificial per-email delay applied to sign-in and sign-up
    latency: DashMap<String, Duration>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            listeners: Arc::new(DashMap::new()),
            offline: AtomicBool::new(false),
            latency: DashMap::new(),
        }
    }

    /// Backend seeded with a demo client account and a few records
    pub async fn with_demo_data() -> Self {
        let backend = Self::new();
        let user = backend
            .seed_account(DEMO_EMAIL, DEMO_PASSWORD, "Demo Client", Role::Client)
            .await;

        let today = Utc::now().date_naive();
        let day = |offset: i64| today + ChronoDuration::days(offset);
        backend
            .seed_booking(
                user.id,
                vec!["sony-fx3".to_string(), "dji-ronin-rs4-pro".to_string()],
                (day(10), day(12)),
                BookingStatus::Confirmed,
                1800.0,
            )
            .await;
        backend
            .seed_booking(
                user.id,
                vec!["arri-skypanel-s60c".to_string()],
                (day(20), day(20)),
                BookingStatus::Pending,
                650.0,
            )
            .await;
        backend
            .seed_quote(
                user.id,
                "Drone filming",
                "Aerial coverage of a waterfront property launch",
                Some(8000.0),
                QuoteStatus::Sent,
            )
            .await;

        info!("Seeded demo account {}", DEMO_EMAIL);
        backend
    }

    /// Insert an account directly, bypassing sign-up
    pub async fn seed_account(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: Role,
    ) -> User {
        let mut profile = Profile::new(full_name);
        profile.role = role;
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: Utc::now(),
            profile,
        };

        let mut tables = self.tables.write().await;
        tables.accounts.insert(
            normalize_email(email),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        user
    }

    /// Insert a booking row with an explicit status
    pub async fn seed_booking(
        &self,
        user_id: Uuid,
        equipment_items: Vec<String>,
        (start_date, end_date): (NaiveDate, NaiveDate),
        status: BookingStatus,
        total_amount: f64,
    ) -> Booking {
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id,
            equipment_items,
            start_date,
            end_date,
            status,
            total_amount,
            created_at: Utc::now(),
        };
        self.tables.write().await.bookings.push(booking.clone());
        booking
    }

    /// Insert a quote row with an explicit status
    pub async fn seed_quote(
        &self,
        user_id: Uuid,
        service_type: &str,
        project_description: &str,
        estimated_amount: Option<f64>,
        status: QuoteStatus,
    ) -> Quote {
        let quote = Quote {
            id: Uuid::new_v4(),
            user_id,
            service_type: service_type.to_string(),
            project_description: project_description.to_string(),
            estimated_amount,
            status,
            created_at: Utc::now(),
            valid_until: None,
        };
        self.tables.write().await.quotes.push(quote.clone());
        quote
    }

    /// Make every call fail with a network error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay sign-in and sign-up calls for `email`
    pub fn set_latency(&self, email: &str, delay: Duration) {
        self.latency.insert(normalize_email(email), delay);
    }

    /// End the issued session out of band, as a token expiry would
    pub async fn expire_session(&self) {
        let expired = self.tables.write().await.current.take();
        if let Some(user_id) = expired {
            debug!("Session for user {} expired", user_id);
            notify_listeners(&self.listeners, None);
        }
    }

    /// Emails that received a reset message, oldest first
    pub async fn reset_requests(&self) -> Vec<String> {
        self.tables.read().await.reset_requests.clone()
    }

    /// Number of live auth-state subscriptions
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn check_online(&self) -> Result<(), BackendError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BackendError::network("Failed to fetch"));
        }
        Ok(())
    }

    async fn simulate_latency(&self, email: &str) {
        let delay = self.latency.get(&normalize_email(email)).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthBackend for InMemoryBackend {
    async fn current_user(&self) -> Result<Option<User>, BackendError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let Some(id) = tables.current else {
            return Ok(None);
        };
        Ok(tables.account_by_id(id).map(|a| a.user.clone()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, BackendError> {
        self.simulate_latency(email).await;
        self.check_online()?;

        let mut tables = self.tables.write().await;
        let user = match tables.accounts.get(&normalize_email(email)) {
            Some(account) if account.password == password => account.user.clone(),
            _ => return Err(BackendError::invalid_credentials()),
        };
        tables.current = Some(user.id);
        Ok(user)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<User, BackendError> {
        self.simulate_latency(email).await;
        self.check_online()?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BackendError::weak_password(MIN_PASSWORD_LEN));
        }

        let key = normalize_email(email);
        let mut tables = self.tables.write().await;
        if tables.accounts.contains_key(&key) {
            return Err(BackendError::email_already_in_use());
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.trim().to_string(),
            created_at: Utc::now(),
            profile: Profile::new(full_name.trim()),
        };
        tables.accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        tables.current = Some(user.id);
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.check_online()?;
        self.tables.write().await.current = None;
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<(), BackendError> {
        self.check_online()?;
        let key = normalize_email(email);
        let mut tables = self.tables.write().await;
        if !tables.accounts.contains_key(&key) {
            return Err(BackendError::unknown_email());
        }
        tables.reset_requests.push(key);
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Profile, BackendError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let account = tables
            .account_by_id(user_id)
            .ok_or_else(BackendError::not_authenticated)?;
        account.user.profile.merge(update);
        Ok(account.user.profile.clone())
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        AuthSubscription::register(&self.listeners)
    }
}

#[async_trait]
impl RecordStore for InMemoryBackend {
    async fn bookings_for(&self, user_id: Uuid) -> Result<Vec<Booking>, BackendError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Booking> = tables
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |b| b.created_at);
        Ok(rows)
    }

    async fn quotes_for(&self, user_id: Uuid) -> Result<Vec<Quote>, BackendError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Quote> = tables
            .quotes
            .iter()
            .filter(|q| q.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |q| q.created_at);
        Ok(rows)
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, BackendError> {
        self.check_online()?;
        if booking.end_date < booking.start_date {
            return Err(BackendError::validation("End date must not precede start date"));
        }
        let row = Booking {
            id: Uuid::new_v4(),
            user_id: booking.user_id,
            equipment_items: booking.equipment_items,
            start_date: booking.start_date,
            end_date: booking.end_date,
            status: BookingStatus::Pending,
            total_amount: booking.total_amount,
            created_at: Utc::now(),
        };
        self.tables.write().await.bookings.push(row.clone());
        Ok(row)
    }

    async fn insert_quote(&self, quote: NewQuote) -> Result<Quote, BackendError> {
        self.check_online()?;
        let row = Quote {
            id: Uuid::new_v4(),
            user_id: quote.user_id,
            service_type: quote.service_type,
            project_description: quote.project_description,
            estimated_amount: quote.estimated_amount,
            status: QuoteStatus::Draft,
            created_at: Utc::now(),
            valid_until: None,
        };
        self.tables.write().await.quotes.push(row.clone());
        Ok(row)
    }
}
