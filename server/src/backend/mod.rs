//! Backing service module for authentication and record storage
//!
//! This module provides:
//! - `AuthBackend` and `RecordStore` traits isolating the hosted service
//! - `InMemoryBackend` for tests and demo mode
//! - `RestBackend` speaking the hosted auth and table-store HTTP API

mod memory;
mod remote;
mod service;
mod types;

pub use memory::InMemoryBackend;
pub use remote::RestBackend;
pub use service::{
    AuthBackend, AuthListeners, AuthSubscription, Backend, RecordStore, notify_listeners,
};
pub use types::{BackendError, ErrorKind};
