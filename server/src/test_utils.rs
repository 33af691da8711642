//! Test Utilities Module
//!
//! Provides helper functions and fixtures for testing the session layer and routes.
//! This module is only compiled when running tests.

#![cfg(test)]

use crate::backend::InMemoryBackend;
use crate::server::{AppState, api_routes};
use crate::session::{Role, SessionManager};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::util::ServiceExt;

// ============================================================================
// Fixtures
// ============================================================================

/// Create a session manager on top of an in-memory backend
pub fn create_manager(backend: &Arc<InMemoryBackend>) -> SessionManager {
    SessionManager::new(backend.clone())
}

/// In-memory backend with a single client account
pub async fn seeded_backend(email: &str, password: &str) -> Arc<InMemoryBackend> {
    let backend = Arc::new(InMemoryBackend::new());
    backend
        .seed_account(email, password, "Test Client", Role::Client)
        .await;
    backend
}

// ============================================================================
// Test Context
// ============================================================================

/// Router plus the backend behind it
pub struct TestContext {
    pub backend: Arc<InMemoryBackend>,
    pub app_state: AppState,
    pub router: Router,
}

impl TestContext {
    pub async fn new(backend: Arc<InMemoryBackend>) -> Self {
        let manager = Arc::new(create_manager(&backend));
        manager.wait_until_ready().await;
        let app_state = AppState::new(manager);
        let router = api_routes(app_state.clone());
        Self {
            backend,
            app_state,
            router,
        }
    }

    /// Make an HTTP request to the test router
    pub async fn request(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request")
    }

    /// Send a request with an optional JSON body and parse the JSON response
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Option<T>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&body).expect("Failed to serialize body"),
                )),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self.request(request).await;
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        let json: Option<T> = serde_json::from_slice(&body).ok();
        (status, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::routes::{ApiErrorResponse, SessionResponse, TabResponse};
    use crate::session::Session;
    use serde_json::json;

    const EMAIL: &str = "client@example.com";
    const PASSWORD: &str = "correct-horse";

    #[tokio::test]
    async fn test_route_sign_in_updates_session() {
        let ctx = TestContext::new(seeded_backend(EMAIL, PASSWORD).await).await;

        let (status, _) = ctx
            .send_json::<serde_json::Value>(
                "POST",
                "/api/auth/sign-in",
                Some(json!({ "email": EMAIL, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = ctx
            .send_json::<SessionResponse>("GET", "/api/session", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let body = body.expect("Session body");
        assert!(!body.loading);
        assert_eq!(body.session.user().map(|u| u.email.as_str()), Some(EMAIL));
    }

    #[tokio::test]
    async fn test_route_invalid_form_never_reaches_backend() {
        let ctx = TestContext::new(seeded_backend(EMAIL, PASSWORD).await).await;
        ctx.backend.set_offline(true);

        let (status, body) = ctx
            .send_json::<ApiErrorResponse>(
                "POST",
                "/api/auth/sign-in",
                Some(json!({ "email": "not-an-email", "password": "" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.expect("Error body").code, "validation");
        assert_eq!(
            ctx.app_state.session_manager.session().await,
            Session::Unauthenticated
        );
    }

    #[tokio::test]
    async fn test_route_admin_tabs() {
        let backend = Arc::new(InMemoryBackend::new());
        backend
            .seed_account("boss@example.com", "boss-pass", "Boss", Role::Admin)
            .await;
        let ctx = TestContext::new(backend).await;

        let (status, _) = ctx
            .send_json::<ApiErrorResponse>("GET", "/api/dashboard/tabs", None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        ctx.app_state
            .session_manager
            .sign_in("boss@example.com", "boss-pass")
            .await
            .unwrap();
        let (status, tabs) = ctx
            .send_json::<Vec<TabResponse>>("GET", "/api/dashboard/tabs", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let tabs = tabs.expect("Tabs body");
        assert_eq!(tabs.len(), 8);
        assert_eq!(tabs[6].id, "all-bookings");
    }
}
