//! UnityMedia Server Library
//!
//! This module exports the session layer and HTTP routes for use in
//! integration tests and external tooling.

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod i18n;
pub mod records;
pub mod server;
pub mod session;
pub mod validation;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use backend::{Backend, BackendError, ErrorKind, InMemoryBackend, RestBackend};
pub use server::{AppState, api_routes};
pub use session::{Session, SessionError, SessionEvent, SessionManager, User};
