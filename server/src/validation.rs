//! Form schemas checked before a request reaches the session manager

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::session::ProfileUpdate;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_FULL_NAME_LEN: usize = 2;

const INVALID_EMAIL: &str = "Invalid email address";
const SHORT_PASSWORD: &str = "Password must be at least 6 characters";
const SHORT_FULL_NAME: &str = "Full name must be at least 2 characters";
const PASSWORD_MISMATCH: &str = "Passwords don't match";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@.]+$").expect("valid email regex"));

/// One failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// All failed rules of a form, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    /// First message recorded for `field`
    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResetPasswordForm {
    pub email: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

pub fn validate_sign_in(form: &SignInForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !is_valid_email(&form.email) {
        errors.push("email", INVALID_EMAIL);
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("password", SHORT_PASSWORD);
    }
    errors.into_result()
}

pub fn validate_sign_up(form: &SignUpForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if char_len(&form.full_name) < MIN_FULL_NAME_LEN {
        errors.push("full_name", SHORT_FULL_NAME);
    }
    if !is_valid_email(&form.email) {
        errors.push("email", INVALID_EMAIL);
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("password", SHORT_PASSWORD);
    }
    if form.password != form.confirm_password {
        errors.push("confirm_password", PASSWORD_MISMATCH);
    }
    errors.into_result()
}

pub fn validate_reset(form: &ResetPasswordForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !is_valid_email(&form.email) {
        errors.push("email", INVALID_EMAIL);
    }
    errors.into_result()
}

/// Only fields present in the update are checked
pub fn validate_profile(update: &ProfileUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if let Some(name) = &update.full_name
        && char_len(name) < MIN_FULL_NAME_LEN
    {
        errors.push("full_name", SHORT_FULL_NAME);
    }
    errors.into_result()
}
