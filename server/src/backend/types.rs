//! Backend error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure categories reported by a backing service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidCredentials,
    EmailAlreadyInUse,
    WeakPassword,
    UnknownEmail,
    Validation,
    NotAuthenticated,
    Network,
}

impl ErrorKind {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidCredentials => "invalid_credentials",
            ErrorKind::EmailAlreadyInUse => "email_already_in_use",
            ErrorKind::WeakPassword => "weak_password",
            ErrorKind::UnknownEmail => "unknown_email",
            ErrorKind::Validation => "validation",
            ErrorKind::NotAuthenticated => "not_authenticated",
            ErrorKind::Network => "network",
        }
    }
}

/// Typed failure from a backing service (kind + message)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: ErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid login credentials")
    }

    pub fn email_already_in_use() -> Self {
        Self::new(ErrorKind::EmailAlreadyInUse, "User already registered")
    }

    pub fn weak_password(min_len: usize) -> Self {
        Self::new(
            ErrorKind::WeakPassword,
            format!("Password should be at least {} characters", min_len),
        )
    }

    pub fn unknown_email() -> Self {
        Self::new(ErrorKind::UnknownEmail, "No account found for this email")
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorKind::NotAuthenticated, "Not signed in")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::network(e.to_string())
    }
}
