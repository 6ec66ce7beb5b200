//! User accounts and the forms that create or edit them

use crate::core::locale::Currency;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub preferred_currency: Currency,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            full_name: None,
            phone: None,
            address: None,
            avatar_url: None,
            password_hash,
            preferred_currency: Currency::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Apply a validated profile form
    ///
    /// Blank optional fields are cleared. The currency is only changed when
    /// the form names a supported one.
    pub fn apply_profile(&mut self, form: &ProfileForm) {
        self.username = form.username.trim().to_string();
        self.email = form.email.trim().to_string();
        self.full_name = blank_to_none(&form.full_name);
        self.phone = blank_to_none(&form.phone);
        self.address = blank_to_none(&form.address);
        self.avatar_url = blank_to_none(&form.avatar_url);
        if let Some(currency) = form.currency() {
            self.preferred_currency = currency;
        }
        self.touch();
    }
}

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Sign-up form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "passwords_match", skip_on_field_errors = false))]
pub struct SignupForm {
    #[validate(custom(function = "not_blank", message = "All fields are required."))]
    pub username: String,
    #[validate(custom(function = "not_blank", message = "All fields are required."))]
    pub email: String,
    #[validate(custom(function = "not_blank", message = "All fields are required."))]
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// Trim every field in place
    pub fn trimmed(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.trim().to_string(),
            confirm_password: self.confirm_password.trim().to_string(),
        }
    }
}

fn passwords_match(form: &SignupForm) -> Result<(), ValidationError> {
    if form.password != form.confirm_password {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some("Passwords do not match.".into());
        return Err(err);
    }
    Ok(())
}

/// Login form; `username` may hold a username or an email
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub remember_me: Option<String>,
}

impl LoginForm {
    pub fn remember(&self) -> bool {
        self.remember_me.is_some()
    }
}

/// Profile edit form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileForm {
    #[validate(custom(function = "not_blank", message = "Username and email are required."))]
    pub username: String,
    #[validate(custom(function = "not_blank", message = "Username and email are required."))]
    pub email: String,
    pub full_name: Option<String>,
    #[validate(custom(function = "valid_phone", message = "Phone number is not valid."))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(custom(
        function = "valid_url",
        message = "Avatar URL must start with http:// or https://."
    ))]
    pub avatar_url: Option<String>,
    pub preferred_currency: Option<String>,
}

impl ProfileForm {
    /// Requested currency, `None` when blank or unsupported
    pub fn currency(&self) -> Option<Currency> {
        self.preferred_currency
            .as_deref()
            .and_then(|c| c.parse().ok())
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Blank phone numbers are accepted and later cleared
fn valid_phone(value: &str) -> Result<(), ValidationError> {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX.get_or_init(|| {
        // Optional +, then 7 to 20 digits, spaces, dashes or parentheses
        Regex::new(r"^\+?[0-9][0-9 ()\-]{6,19}$").expect("phone pattern compiles")
    });

    let value = value.trim();
    if value.is_empty() || regex.is_match(value) {
        return Ok(());
    }
    Err(ValidationError::new("phone"))
}

fn valid_url(value: &str) -> Result<(), ValidationError> {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = URL_REGEX
        .get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("url pattern compiles"));

    let value = value.trim();
    if value.is_empty() || regex.is_match(value) {
        return Ok(());
    }
    Err(ValidationError::new("url"))
}

/// First human readable message out of a set of validation errors
pub fn first_message(errors: &validator::ValidationErrors) -> String {
    let field_messages = errors
        .field_errors()
        .into_values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()));

    let schema_messages = errors
        .errors()
        .get("__all__")
        .into_iter()
        .filter_map(|kind| match kind {
            validator::ValidationErrorsKind::Field(errs) => Some(errs),
            _ => None,
        })
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()));

    field_messages
        .chain(schema_messages)
        .next()
        .unwrap_or_else(|| "Invalid input.".to_string())
}
