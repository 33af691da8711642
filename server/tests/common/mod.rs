//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules.

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;
use unitymedia_server::backend::InMemoryBackend;
use unitymedia_server::config::{BackendConfig, BackendMode};
use unitymedia_server::session::Role;
use unitymedia_server::{AppState, SessionManager, api_routes};
use uuid::Uuid;

pub const EMAIL: &str = "client@example.com";
pub const PASSWORD: &str = "correct-horse";

/// In-memory backend with a single client account
pub async fn seeded_backend() -> Arc<InMemoryBackend> {
    let backend = Arc::new(InMemoryBackend::new());
    backend
        .seed_account(EMAIL, PASSWORD, "Test Client", Role::Client)
        .await;
    backend
}

/// Create a test application router with state
pub async fn create_test_app_with_state(backend: Arc<InMemoryBackend>) -> (Router, AppState) {
    let manager = Arc::new(SessionManager::new(backend));
    manager.wait_until_ready().await;
    let app_state = AppState::new(manager);
    (api_routes(app_state.clone()), app_state)
}

/// Create a test application router with all routes configured
pub async fn create_test_app(backend: Arc<InMemoryBackend>) -> Router {
    create_test_app_with_state(backend).await.0
}

/// Send a request and parse the JSON body (`Value::Null` when there is none)
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// ============================================================================
// Stub hosted API
// ============================================================================

struct StubAccount {
    id: Uuid,
    email: String,
    password: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct StubTables {
    accounts: Vec<StubAccount>,
    /// Issued access tokens and the user they belong to
    tokens: HashMap<String, Uuid>,
    profiles: HashMap<Uuid, Value>,
    bookings: Vec<Value>,
    quotes: Vec<Value>,
    recover_requests: Vec<String>,
    token_ttl_secs: i64,
    /// Users whose profile lookups fail with 503
    unavailable_profiles: HashSet<Uuid>,
    /// Bearer of the latest table request
    last_bearer: Option<String>,
}

/// Minimal stand-in for the hosted auth and table-store API
#[derive(Clone)]
pub struct StubApi {
    tables: Arc<Mutex<StubTables>>,
    pub base_url: String,
}

impl StubApi {
    /// Serve the stub on an ephemeral local port
    pub async fn spawn() -> Self {
        let tables = Arc::new(Mutex::new(StubTables {
            token_ttl_secs: 3600,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/auth/v1/token", post(stub_token))
            .route("/auth/v1/signup", post(stub_signup))
            .route("/auth/v1/logout", post(stub_logout))
            .route("/auth/v1/recover", post(stub_recover))
            .route("/auth/v1/user", get(stub_user))
            .route(
                "/rest/v1/profiles",
                get(stub_select_profile)
                    .post(stub_insert_profile)
                    .patch(stub_patch_profile),
            )
            .route(
                "/rest/v1/bookings",
                get(stub_select_bookings).post(stub_insert_booking),
            )
            .route(
                "/rest/v1/quotes",
                get(stub_select_quotes).post(stub_insert_quote),
            )
            .with_state(tables.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            tables,
            base_url: format!("http://{}", addr),
        }
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            mode: BackendMode::Remote,
            url: self.base_url.clone(),
            anon_key: "anon-test-key".to_string(),
            request_timeout: Duration::from_secs(5),
            session_file: None,
        }
    }

    pub fn backend_config_with_session_file(&self, path: PathBuf) -> BackendConfig {
        BackendConfig {
            session_file: Some(path),
            ..self.backend_config()
        }
    }

    /// Register an account with a profile row
    pub fn add_account(&self, email: &str, password: &str, full_name: &str) -> Uuid {
        let id = Uuid::new_v4();
        let mut tables = self.tables.lock().unwrap();
        tables.accounts.push(StubAccount {
            id,
            email: email.to_string(),
            password: password.to_string(),
            created_at: Utc::now(),
        });
        tables.profiles.insert(
            id,
            json!({
                "id": id,
                "full_name": full_name,
                "company_name": null,
                "phone": null,
                "role": "client",
            }),
        );
        id
    }

    pub fn add_booking(&self, user_id: Uuid, total_amount: f64, created_at: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.tables.lock().unwrap().bookings.push(json!({
            "id": id,
            "user_id": user_id,
            "equipment_items": ["sony-fx3"],
            "start_date": "2026-03-01",
            "end_date": "2026-03-03",
            "status": "confirmed",
            "total_amount": total_amount,
            "created_at": created_at,
        }));
        id
    }

    pub fn add_quote(&self, user_id: Uuid, service_type: &str, created_at: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.tables.lock().unwrap().quotes.push(json!({
            "id": id,
            "user_id": user_id,
            "service_type": service_type,
            "project_description": "Launch event coverage",
            "estimated_amount": null,
            "status": "sent",
            "created_at": created_at,
        }));
        id
    }

    /// Lifetime of tokens issued from now on
    pub fn set_token_ttl(&self, secs: i64) {
        self.tables.lock().unwrap().token_ttl_secs = secs;
    }

    /// Invalidate every issued token
    pub fn revoke_all_tokens(&self) {
        self.tables.lock().unwrap().tokens.clear();
    }

    /// Make profile lookups for `user_id` fail as if the table store were down
    pub fn fail_profile_lookups(&self, user_id: Uuid) {
        self.tables.lock().unwrap().unavailable_profiles.insert(user_id);
    }

    /// Owner of the token sent with the latest table request
    pub fn last_bearer_owner(&self) -> Option<Uuid> {
        let tables = self.tables.lock().unwrap();
        let bearer = tables.last_bearer.as_ref()?;
        tables.tokens.get(bearer).copied()
    }

    pub fn booking_count(&self) -> usize {
        self.tables.lock().unwrap().bookings.len()
    }

    pub fn issued_token_count(&self) -> usize {
        self.tables.lock().unwrap().tokens.len()
    }

    pub fn recover_requests(&self) -> Vec<String> {
        self.tables.lock().unwrap().recover_requests.clone()
    }

    pub fn profile(&self, user_id: Uuid) -> Option<Value> {
        self.tables.lock().unwrap().profiles.get(&user_id).cloned()
    }
}

type Tables = Arc<Mutex<StubTables>>;

fn error(status: StatusCode, code: &str, msg: &str) -> Response {
    (status, Json(json!({ "code": status.as_u16(), "error_code": code, "msg": msg }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Reject table requests whose bearer is not a live token
fn authorize(tables: &mut StubTables, headers: &HeaderMap) -> Result<Uuid, Response> {
    let token = bearer(headers);
    let owner = token.as_ref().and_then(|t| tables.tokens.get(t).copied());
    tables.last_bearer = token;
    owner.ok_or_else(|| error(StatusCode::UNAUTHORIZED, "bad_jwt", "invalid JWT"))
}

fn eq_filter(query: &HashMap<String, String>, column: &str) -> Option<Uuid> {
    query
        .get(column)
        .and_then(|v| v.strip_prefix("eq."))
        .and_then(|v| v.parse().ok())
}

fn session_json(tables: &mut StubTables, account_index: usize) -> Value {
    let token = Uuid::new_v4().to_string();
    let account = &tables.accounts[account_index];
    let user = json!({ "id": account.id, "email": account.email, "created_at": account.created_at });
    let id = account.id;
    tables.tokens.insert(token.clone(), id);
    json!({
        "access_token": token,
        "token_type": "bearer",
        "expires_in": tables.token_ttl_secs,
        "user": user,
    })
}

async fn stub_token(
    State(tables): State<Tables>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if query.get("grant_type").map(String::as_str) != Some("password") {
        return error(StatusCode::BAD_REQUEST, "validation_failed", "Unsupported grant type");
    }
    let mut tables = tables.lock().unwrap();
    let found = tables
        .accounts
        .iter()
        .position(|a| a.email == body["email"] && a.password == body["password"]);
    match found {
        Some(index) => Json(session_json(&mut tables, index)).into_response(),
        None => error(
            StatusCode::BAD_REQUEST,
            "invalid_credentials",
            "Invalid login credentials",
        ),
    }
}

async fn stub_signup(State(tables): State<Tables>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let mut tables = tables.lock().unwrap();
    if tables.accounts.iter().any(|a| a.email == email) {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "user_already_exists",
            "User already registered",
        );
    }
    if password.len() < 6 {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "weak_password",
            "Password should be at least 6 characters",
        );
    }
    tables.accounts.push(StubAccount {
        id: Uuid::new_v4(),
        email,
        password,
        created_at: Utc::now(),
    });
    let index = tables.accounts.len() - 1;
    Json(session_json(&mut tables, index)).into_response()
}

async fn stub_logout(State(tables): State<Tables>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer(&headers) {
        tables.lock().unwrap().tokens.remove(&token);
    }
    StatusCode::NO_CONTENT
}

async fn stub_recover(State(tables): State<Tables>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let mut tables = tables.lock().unwrap();
    if !tables.accounts.iter().any(|a| a.email == email) {
        return error(StatusCode::NOT_FOUND, "user_not_found", "User not found");
    }
    tables.recover_requests.push(email);
    Json(json!({})).into_response()
}

async fn stub_user(State(tables): State<Tables>, headers: HeaderMap) -> Response {
    let tables = tables.lock().unwrap();
    let account = bearer(&headers)
        .and_then(|token| tables.tokens.get(&token).copied())
        .and_then(|id| tables.accounts.iter().find(|a| a.id == id));
    match account {
        Some(a) => {
            Json(json!({ "id": a.id, "email": a.email, "created_at": a.created_at })).into_response()
        }
        None => error(StatusCode::UNAUTHORIZED, "bad_jwt", "invalid JWT"),
    }
}

async fn stub_select_profile(
    State(tables): State<Tables>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut tables = tables.lock().unwrap();
    if let Err(response) = authorize(&mut tables, &headers) {
        return response;
    }
    let id = eq_filter(&query, "id");
    if id.is_some_and(|id| tables.unavailable_profiles.contains(&id)) {
        return error(StatusCode::SERVICE_UNAVAILABLE, "unavailable", "Service unavailable");
    }
    let rows: Vec<Value> = id
        .and_then(|id| tables.profiles.get(&id).cloned())
        .into_iter()
        .collect();
    Json(rows).into_response()
}

async fn stub_insert_profile(
    State(tables): State<Tables>,
    headers: HeaderMap,
    Json(row): Json<Value>,
) -> Response {
    let mut tables = tables.lock().unwrap();
    if let Err(response) = authorize(&mut tables, &headers) {
        return response;
    }
    let Some(id) = row["id"].as_str().and_then(|v| v.parse::<Uuid>().ok()) else {
        return error(StatusCode::BAD_REQUEST, "validation_failed", "Missing id");
    };
    tables.profiles.insert(id, row.clone());
    (StatusCode::CREATED, Json(vec![row])).into_response()
}

async fn stub_patch_profile(
    State(tables): State<Tables>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(patch): Json<Value>,
) -> Response {
    let mut tables = tables.lock().unwrap();
    if let Err(response) = authorize(&mut tables, &headers) {
        return response;
    }
    let mut rows = Vec::new();
    if let Some(id) = eq_filter(&query, "id")
        && let Some(row) = tables.profiles.get_mut(&id)
    {
        if let (Some(row_map), Some(patch_map)) = (row.as_object_mut(), patch.as_object()) {
            for (k, v) in patch_map {
                row_map.insert(k.clone(), v.clone());
            }
        }
        rows.push(row.clone());
    }
    Json(rows).into_response()
}

fn select_owned(rows: &[Value], query: &HashMap<String, String>) -> Vec<Value> {
    let user_id = eq_filter(query, "user_id");
    let mut selected: Vec<Value> = rows
        .iter()
        .filter(|row| row["user_id"].as_str().and_then(|v| v.parse::<Uuid>().ok()) == user_id)
        .cloned()
        .collect();
    if query.get("order").map(String::as_str) == Some("created_at.desc") {
        selected.sort_by(|a, b| {
            let key = |row: &Value| {
                row["created_at"]
                    .as_str()
                    .and_then(|v| v.parse::<DateTime<Utc>>().ok())
            };
            key(b).cmp(&key(a))
        });
    }
    selected
}

async fn stub_select_bookings(
    State(tables): State<Tables>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut tables = tables.lock().unwrap();
    if let Err(response) = authorize(&mut tables, &headers) {
        return response;
    }
    Json(select_owned(&tables.bookings, &query)).into_response()
}

async fn stub_select_quotes(
    State(tables): State<Tables>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut tables = tables.lock().unwrap();
    if let Err(response) = authorize(&mut tables, &headers) {
        return response;
    }
    Json(select_owned(&tables.quotes, &query)).into_response()
}

/// Fill in the server-side columns of a new row and store it
fn insert_record(
    tables: &Tables,
    headers: &HeaderMap,
    mut row: Value,
    defaults: Value,
    pick: fn(&mut StubTables) -> &mut Vec<Value>,
) -> Response {
    let mut tables = tables.lock().unwrap();
    if let Err(response) = authorize(&mut tables, headers) {
        return response;
    }
    let (Some(row_map), Some(defaults)) = (row.as_object_mut(), defaults.as_object()) else {
        return error(StatusCode::BAD_REQUEST, "validation_failed", "Expected an object");
    };
    row_map.insert("id".to_string(), json!(Uuid::new_v4()));
    row_map.insert("created_at".to_string(), json!(Utc::now()));
    for (k, v) in defaults {
        row_map.entry(k.clone()).or_insert_with(|| v.clone());
    }
    pick(&mut tables).push(row.clone());

    let representation = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("return=representation"));
    if representation {
        (StatusCode::CREATED, Json(vec![row])).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn stub_insert_booking(
    State(tables): State<Tables>,
    headers: HeaderMap,
    Json(row): Json<Value>,
) -> Response {
    insert_record(&tables, &headers, row, json!({ "status": "pending" }), |t| {
        &mut t.bookings
    })
}

async fn stub_insert_quote(
    State(tables): State<Tables>,
    headers: HeaderMap,
    Json(row): Json<Value>,
) -> Response {
    insert_record(
        &tables,
        &headers,
        row,
        json!({ "status": "draft", "estimated_amount": null, "valid_until": null }),
        |t| &mut t.quotes,
    )
}
