//! HTTP route handlers for the dashboard API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::backend::ErrorKind;
use crate::dashboard::{DashboardTab, tabs_for};
use crate::i18n::{Language, TextDirection, translate};
use crate::records::{Booking, Quote, format_aed};
use crate::session::{ProfileUpdate, Session, SessionError, SessionManager, User};
use crate::validation::{
    FieldError, ResetPasswordForm, SignInForm, SignUpForm, ValidationErrors, validate_reset,
    validate_sign_in, validate_sign_up,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub session_manager: Arc<SessionManager>,
    pub default_language: Language,
}

impl AppState {
    pub fn new(session_manager: Arc<SessionManager>) -> Self {
        Self {
            session_manager,
            default_language: Language::default(),
        }
    }

    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }
}

/// Error response for the dashboard API
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty", skip_deserializing)]
    pub fields: Vec<FieldError>,
}

impl From<SessionError> for ApiErrorResponse {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Validation(errors) => errors.into(),
            SessionError::Backend(e) => Self {
                error: e.message,
                code: e.kind.code().to_string(),
                fields: Vec::new(),
            },
        }
    }
}

impl From<ValidationErrors> for ApiErrorResponse {
    fn from(errors: ValidationErrors) -> Self {
        Self {
            error: errors.to_string(),
            code: ErrorKind::Validation.code().to_string(),
            fields: errors.errors,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "invalid_credentials" | "not_authenticated" => StatusCode::UNAUTHORIZED,
            "email_already_in_use" => StatusCode::CONFLICT,
            "weak_password" | "validation" => StatusCode::UNPROCESSABLE_ENTITY,
            "unknown_email" => StatusCode::NOT_FOUND,
            "unsupported_language" => StatusCode::BAD_REQUEST,
            "network" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiErrorResponse>;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub session_loading: bool,
}

/// Response for GET /api/session
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub loading: bool,
    pub session: Session,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Booking row plus the labels the dashboard shows
#[derive(Debug, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub reference: String,
    pub status_label: String,
    pub total_label: String,
    pub rental_days: i64,
    pub cancellable: bool,
}

impl From<Booking> for BookingView {
    fn from(booking: Booking) -> Self {
        Self {
            reference: booking.reference(),
            status_label: booking.status.label(),
            total_label: format_aed(booking.total_amount),
            rental_days: booking.rental_days(),
            cancellable: booking.is_cancellable(),
            booking,
        }
    }
}

/// Quote row plus the labels the dashboard shows
#[derive(Debug, Serialize)]
pub struct QuoteView {
    #[serde(flatten)]
    pub quote: Quote,
    pub status_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_label: Option<String>,
    pub acceptable: bool,
    /// Validity deadline has passed
    pub expired: bool,
}

impl From<Quote> for QuoteView {
    fn from(quote: Quote) -> Self {
        Self {
            status_label: quote.status.label(),
            estimated_label: quote.estimated_amount.map(format_aed),
            acceptable: quote.is_acceptable(),
            expired: quote.is_past_deadline(Utc::now()),
            quote,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TabResponse {
    pub id: String,
    pub label: String,
}

impl From<DashboardTab> for TabResponse {
    fn from(tab: DashboardTab) -> Self {
        Self {
            id: tab.id().to_string(),
            label: tab.label().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub language: Language,
    pub direction: TextDirection,
    pub key: String,
    pub text: String,
    /// Label of the button that switches to the other language
    pub switch_label: String,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        session_loading: state.session_manager.is_loading(),
    })
}

/// GET /api/session - Current session snapshot
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        loading: state.session_manager.is_loading(),
        session: state.session_manager.session().await,
    })
}

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(form): Json<SignInForm>,
) -> ApiResult<Json<User>> {
    validate_sign_in(&form)?;
    let user = state
        .session_manager
        .sign_in(form.email.trim(), &form.password)
        .await?;
    Ok(Json(user))
}

/// POST /api/auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    Json(form): Json<SignUpForm>,
) -> ApiResult<(StatusCode, Json<User>)> {
    validate_sign_up(&form)?;
    let user = state
        .session_manager
        .sign_up(form.email.trim(), &form.password, form.full_name.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/auth/sign-out
pub async fn sign_out(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.session_manager.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(form): Json<ResetPasswordForm>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    validate_reset(&form)?;
    state
        .session_manager
        .reset_password(form.email.trim())
        .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Password reset email sent".to_string(),
        }),
    ))
}

/// PATCH /api/profile - Merge the provided profile fields
pub async fn update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<User>> {
    let user = state.session_manager.update_profile(update).await?;
    Ok(Json(user))
}

/// GET /api/bookings - Signed-in user's bookings, newest first
pub async fn list_bookings(State(state): State<AppState>) -> ApiResult<Json<Vec<BookingView>>> {
    let bookings = state.session_manager.bookings().await.map_err(|e| {
        tracing::warn!("Failed to fetch bookings: {}", e);
        ApiErrorResponse::from(e)
    })?;
    Ok(Json(bookings.into_iter().map(BookingView::from).collect()))
}

/// GET /api/quotes - Signed-in user's quotes, newest first
pub async fn list_quotes(State(state): State<AppState>) -> ApiResult<Json<Vec<QuoteView>>> {
    let quotes = state.session_manager.quotes().await.map_err(|e| {
        tracing::warn!("Failed to fetch quotes: {}", e);
        ApiErrorResponse::from(e)
    })?;
    Ok(Json(quotes.into_iter().map(QuoteView::from).collect()))
}

async fn require_user(state: &AppState) -> ApiResult<User> {
    state
        .session_manager
        .current_user()
        .await
        .ok_or_else(|| ApiErrorResponse {
            error: "Not signed in".to_string(),
            code: ErrorKind::NotAuthenticated.code().to_string(),
            fields: Vec::new(),
        })
}

/// GET /api/dashboard/tabs - Sidebar tabs for the signed-in user's role
pub async fn dashboard_tabs(State(state): State<AppState>) -> ApiResult<Json<Vec<TabResponse>>> {
    let user = require_user(&state).await?;
    let tabs = tabs_for(user.profile.role)
        .into_iter()
        .map(TabResponse::from)
        .collect();
    Ok(Json(tabs))
}

/// GET /api/dashboard/tabs/:id - Tab to open for a requested id.
///
/// Unknown ids, and admin tabs requested by a client, open the overview.
pub async fn open_tab(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TabResponse>> {
    let user = require_user(&state).await?;
    let tab = match DashboardTab::from_id(&id) {
        tab if tab.requires_admin() && !user.is_admin() => DashboardTab::Overview,
        tab => tab,
    };
    Ok(Json(tab.into()))
}

fn translation(language: Language, key: String) -> Json<TranslationResponse> {
    let text = translate(language, &key).to_string();
    Json(TranslationResponse {
        language,
        direction: language.direction(),
        key,
        text,
        switch_label: language.switch_label().to_string(),
    })
}

/// GET /api/i18n/:key - Translate in the default language
pub async fn translate_default(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<TranslationResponse> {
    translation(state.default_language, key)
}

/// GET /api/i18n/:lang/:key
pub async fn translate_in(
    Path((lang, key)): Path<(String, String)>,
) -> ApiResult<Json<TranslationResponse>> {
    let language: Language = lang.parse().map_err(|e: crate::i18n::UnknownLanguage| {
        ApiErrorResponse {
            error: e.to_string(),
            code: "unsupported_language".to_string(),
            fields: Vec::new(),
        }
    })?;
    Ok(translation(language, key))
}

/// Build dashboard API routes
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/session", get(get_session))
        .route("/api/auth/sign-in", post(sign_in))
        .route("/api/auth/sign-up", post(sign_up))
        .route("/api/auth/sign-out", post(sign_out))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/profile", patch(update_profile))
        .route("/api/bookings", get(list_bookings))
        .route("/api/quotes", get(list_quotes))
        .route("/api/dashboard/tabs", get(dashboard_tabs))
        .route("/api/dashboard/tabs/:id", get(open_tab))
        .route("/api/i18n/:key", get(translate_default))
        .route("/api/i18n/:lang/:key", get(translate_in))
        .with_state(state)
}
