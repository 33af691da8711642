//! Backing service reached over the hosted auth and table-store HTTP API

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::service::{
    AuthBackend, AuthListeners, AuthSubscription, RecordStore, notify_listeners,
};
use super::types::{BackendError, ErrorKind};
use crate::config::BackendConfig;
use crate::records::{Booking, NewBooking, NewQuote, Quote};
use crate::session::{Profile, ProfileUpdate, Role, User};

/// Access token issued by the auth API, as kept in the session file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn issued(response: &TokenResponse) -> Self {
        Self {
            value: response.access_token.clone(),
            expires_at: Utc::now() + ChronoDuration::seconds(response.expires_in),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    user: AuthUser,
}

#[derive(Debug, Clone, Deserialize)]
struct AuthUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    created_at: DateTime<Utc>,
}

/// Sign-up answers with a session when accounts are auto-confirmed and with
/// the bare user otherwise
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

/// Row of the `profiles` table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProfileRow {
    id: Uuid,
    full_name: String,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    role: Role,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            full_name: row.full_name,
            company_name: row.company_name,
            phone: row.phone,
            role: row.role,
        }
    }
}

/// Error payload of either API; the two use different field names
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Map an error response onto a typed failure
fn map_error(status: StatusCode, body: &str) -> BackendError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed
        .error_code
        .clone()
        .or_else(|| parsed.error.clone())
        .unwrap_or_default();
    let message = parsed
        .msg
        .or(parsed.message)
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| format!("Request failed with status {}", status));

    let kind = match code.as_str() {
        "invalid_credentials" | "invalid_grant" => ErrorKind::InvalidCredentials,
        "user_already_exists" | "email_exists" => ErrorKind::EmailAlreadyInUse,
        "weak_password" => ErrorKind::WeakPassword,
        "user_not_found" => ErrorKind::UnknownEmail,
        "validation_failed" => ErrorKind::Validation,
        _ => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::NotAuthenticated,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
            _ => ErrorKind::Network,
        },
    };
    BackendError::new(kind, message)
}

/// Profile name used when an account has no profile row yet
fn fallback_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// Hosted auth and table-store client
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    token: RwLock<Option<AccessToken>>,
    session_file: Option<PathBuf>,
    listeners: AuthListeners,
}

/// Read a session stored by an earlier run
fn load_session(path: &Path) -> Option<AccessToken> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Failed to read session file {:?}: {}", path, e);
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(token) => Some(token),
        Err(e) => {
            warn!("Ignoring malformed session file {:?}: {}", path, e);
            None
        }
    }
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let stored = config.session_file.as_deref().and_then(load_session);
        if stored.is_some() {
            info!("Loaded stored session from {:?}", config.session_file);
        }
        info!("Initialized REST backend at {}", config.url);

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            token: RwLock::new(stored),
            session_file: config.session_file.clone(),
            listeners: Arc::new(dashmap::DashMap::new()),
        })
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let bearer = bearer.unwrap_or(&self.anon_key);
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Send a request and turn an error status into a typed failure.
    ///
    /// With `session_token` set, a 401 means the stored session was revoked.
    async fn execute(
        &self,
        request: RequestBuilder,
        session_token: Option<&str>,
    ) -> Result<reqwest::Response, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED
            && let Some(token) = session_token
        {
            self.end_session_out_of_band(token, "access token rejected")
                .await;
        }
        Err(map_error(status, &body))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        Ok(self.execute(request, None).await?.json::<T>().await?)
    }

    /// Like `send`, for requests made with the stored session's token
    async fn send_authorized<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: &str,
    ) -> Result<T, BackendError> {
        Ok(self.execute(request, Some(token)).await?.json::<T>().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), BackendError> {
        self.execute(request, None).await.map(|_| ())
    }

    /// Token of the stored session. Finding it expired ends the session.
    async fn require_token(&self) -> Result<String, BackendError> {
        let token = { self.token.read().await.clone() };
        match token {
            Some(token) if token.is_expired() => {
                self.end_session_out_of_band(&token.value, "access token expired")
                    .await;
                Err(BackendError::not_authenticated())
            }
            Some(token) => Ok(token.value),
            None => Err(BackendError::not_authenticated()),
        }
    }

    /// Make `token` the stored session
    async fn store_token(&self, token: AccessToken) {
        self.persist(Some(&token)).await;
        *self.token.write().await = Some(token);
    }

    async fn persist(&self, token: Option<&AccessToken>) {
        let Some(path) = &self.session_file else {
            return;
        };
        let result = match token {
            Some(token) => match serde_json::to_vec(token) {
                Ok(bytes) => tokio::fs::write(path, bytes).await,
                Err(e) => {
                    warn!("Failed to encode session: {}", e);
                    return;
                }
            },
            None => match tokio::fs::remove_file(path).await {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        if let Err(e) = result {
            warn!("Failed to update session file {:?}: {}", path, e);
        }
    }

    /// Drop the stored session if it is still `token` and tell listeners it ended
    async fn end_session_out_of_band(&self, token: &str, reason: &str) {
        let ended = {
            let mut stored = self.token.write().await;
            if stored.as_ref().is_some_and(|t| t.value == token) {
                stored.take()
            } else {
                None
            }
        };
        if ended.is_some() {
            warn!("Session ended: {}", reason);
            self.persist(None).await;
            notify_listeners(&self.listeners, None);
        }
    }

    /// Exchange credentials for a token without storing it
    async fn password_grant(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse, BackendError> {
        let request = self
            .request(Method::POST, "/auth/v1/token", None)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        self.send(request).await
    }

    async fn fetch_profile(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> Result<Option<Profile>, BackendError> {
        let request = self
            .request(Method::GET, "/rest/v1/profiles", Some(token))
            .query(&[("id", format!("eq.{}", user_id)), ("select", "*".to_string())]);
        let rows: Vec<ProfileRow> = self.send(request).await?;
        Ok(rows.into_iter().next().map(Profile::from))
    }

    async fn insert_profile(
        &self,
        user_id: Uuid,
        full_name: &str,
        token: &str,
    ) -> Result<Profile, BackendError> {
        let row = ProfileRow {
            id: user_id,
            full_name: full_name.to_string(),
            company_name: None,
            phone: None,
            role: Role::Client,
        };
        let request = self
            .request(Method::POST, "/rest/v1/profiles", Some(token))
            .header("Prefer", "return=representation")
            .json(&row);
        let rows: Vec<ProfileRow> = self.send(request).await?;
        Ok(rows.into_iter().next().map(Profile::from).unwrap_or_else(|| row.into()))
    }

    /// Attach the profile, creating it when the account has none
    async fn assemble_user(&self, auth: AuthUser, token: &str) -> Result<User, BackendError> {
        let email = auth.email.unwrap_or_default();
        let profile = match self.fetch_profile(auth.id, token).await? {
            Some(profile) => profile,
            None => {
                debug!("No profile for user {}, creating one", auth.id);
                self.insert_profile(auth.id, &fallback_name(&email), token)
                    .await?
            }
        };
        Ok(User {
            id: auth.id,
            email,
            created_at: auth.created_at,
            profile,
        })
    }

    async fn select_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        user_id: Uuid,
    ) -> Result<Vec<T>, BackendError> {
        let token = self.require_token().await?;
        let request = self
            .request(Method::GET, &format!("/rest/v1/{}", table), Some(&token))
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("order", "created_at.desc".to_string()),
                ("select", "*".to_string()),
            ]);
        self.send_authorized(request, &token).await
    }

    async fn insert_row<T: DeserializeOwned>(
        &self,
        table: &str,
        row: &impl Serialize,
    ) -> Result<T, BackendError> {
        let token = self.require_token().await?;
        let request = self
            .request(Method::POST, &format!("/rest/v1/{}", table), Some(&token))
            .header("Prefer", "return=representation")
            .json(row);
        let rows: Vec<T> = self.send_authorized(request, &token).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::network(format!("Insert into {} returned no row", table)))
    }
}

#[async_trait]
impl AuthBackend for RestBackend {
    async fn current_user(&self) -> Result<Option<User>, BackendError> {
        let token = match self.require_token().await {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };

        let request = self.request(Method::GET, "/auth/v1/user", Some(&token));
        match self.send_authorized::<AuthUser>(request, &token).await {
            Ok(auth) => Ok(Some(self.assemble_user(auth, &token).await?)),
            // A rejected token has already ended the session
            Err(e) if e.kind == ErrorKind::NotAuthenticated => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, BackendError> {
        let response = self.password_grant(email, password).await?;
        let user = self
            .assemble_user(response.user.clone(), &response.access_token)
            .await?;
        self.store_token(AccessToken::issued(&response)).await;
        Ok(user)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<User, BackendError> {
        let request = self
            .request(Method::POST, "/auth/v1/signup", None)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }));
        let session = match self.send::<SignUpResponse>(request).await? {
            SignUpResponse::Session(session) => session,
            // No session issued yet; sign in to obtain one
            SignUpResponse::User(_) => self.password_grant(email, password).await?,
        };

        let profile = self
            .insert_profile(session.user.id, full_name, &session.access_token)
            .await?;
        self.store_token(AccessToken::issued(&session)).await;
        Ok(User {
            id: session.user.id,
            email: session.user.email.unwrap_or_else(|| email.to_string()),
            created_at: session.user.created_at,
            profile,
        })
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        // The token is forgotten whether or not the server hears about it
        let token = self.token.write().await.take();
        let Some(token) = token else {
            return Ok(());
        };
        self.persist(None).await;
        let request = self.request(Method::POST, "/auth/v1/logout", Some(&token.value));
        self.send_empty(request).await
    }

    async fn reset_password(&self, email: &str) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, "/auth/v1/recover", None)
            .json(&json!({ "email": email }));
        self.send_empty(request).await
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Profile, BackendError> {
        let token = self.require_token().await?;

        let mut patch = Map::new();
        if let Some(name) = &update.full_name {
            patch.insert("full_name".to_string(), Value::from(name.trim()));
        }
        for (field, value) in [("company_name", &update.company_name), ("phone", &update.phone)] {
            if let Some(value) = value {
                let value = value.trim();
                let value = if value.is_empty() {
                    Value::Null
                } else {
                    Value::from(value)
                };
                patch.insert(field.to_string(), value);
            }
        }

        let request = self
            .request(Method::PATCH, "/rest/v1/profiles", Some(&token))
            .query(&[("id", format!("eq.{}", user_id))])
            .header("Prefer", "return=representation")
            .json(&patch);
        let rows: Vec<ProfileRow> = self.send_authorized(request, &token).await?;
        rows.into_iter()
            .next()
            .map(Profile::from)
            .ok_or_else(BackendError::not_authenticated)
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        AuthSubscription::register(&self.listeners)
    }
}

#[async_trait]
impl RecordStore for RestBackend {
    async fn bookings_for(&self, user_id: Uuid) -> Result<Vec<Booking>, BackendError> {
        self.select_rows("bookings", user_id).await
    }

    async fn quotes_for(&self, user_id: Uuid) -> Result<Vec<Quote>, BackendError> {
        self.select_rows("quotes", user_id).await
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, BackendError> {
        self.insert_row("bookings", &booking).await
    }

    async fn insert_quote(&self, quote: NewQuote) -> Result<Quote, BackendError> {
        self.insert_row("quotes", &quote).await
    }
}
