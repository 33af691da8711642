use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role stored on the profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Admin,
}

/// User-supplied account metadata beyond credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl Profile {
    /// Profile created alongside a new account
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            company_name: None,
            phone: None,
            role: Role::Client,
        }
    }

    /// Merge the provided fields, leaving absent ones untouched.
    ///
    /// Blank optional fields clear the stored value, matching what an
    /// emptied form input means.
    pub fn merge(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.full_name {
            self.full_name = name.trim().to_string();
        }
        if let Some(company) = &update.company_name {
            self.company_name = non_blank(company);
        }
        if let Some(phone) = &update.phone {
            self.phone = non_blank(phone);
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Partial profile; `None` means "leave as is"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.company_name.is_none() && self.phone.is_none()
    }
}

/// Authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub profile: Profile,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.profile.role == Role::Admin
    }
}

/// The application's current authentication state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "user", rename_all = "snake_case")]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated(User),
}

impl Session {
    pub fn from_user(user: Option<User>) -> Self {
        match user {
            Some(user) => Session::Authenticated(user),
            None => Session::Unauthenticated,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Authenticated(user) => Some(user),
            Session::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }
}

/// Severity of a transient user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient message shown to the user after an operation (a toast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Event delivered to session subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session transitioned
    Changed { session: Session },
    /// An operation produced a user-facing message
    Notice { notification: Notification },
}

/// Session manager configuration
#[derive(Debug, Clone, Default)]
pub struct SessionManagerConfig {
    /// Run session mutations one at a time, in call order.
    /// When off, the last call to complete decides the final session.
    pub serialize_mutations: bool,
}
