//! Route handlers and shared request validation.

pub mod health;
pub mod principal;
pub mod profile;
pub mod register;
pub mod token;

use crate::{
    api::error::{ApiError, FieldErrors},
    password,
    store::User,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const USERNAME_MAX_CHARS: usize = 150;
pub const NAME_MAX_CHARS: usize = 150;
pub const EMAIL_MAX_CHARS: usize = 254;
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Public representation of an account. Never includes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            date_joined: user.date_joined,
        }
    }
}

/// Lightweight email sanity check.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Trim and lowercase the domain part; the local part is kept as given.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Letters, digits and `@.+-_`, up to 150 characters.
pub fn valid_username(username: &str) -> bool {
    username.chars().count() <= USERNAME_MAX_CHARS
        && Regex::new(r"^[\w.@+-]+$").is_ok_and(|re| re.is_match(username))
}

/// Collect password policy violations into `errors` under `password`.
pub fn check_password(password: &str, errors: &mut FieldErrors) {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.add(
            "password",
            format!(
                "This password is too short. It must contain at least {PASSWORD_MIN_CHARS} characters."
            ),
        );
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.add("password", "This password is entirely numeric.");
    }
}

/// Validate the optional profile fields shared by registration and updates.
pub fn check_profile_fields(
    email: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
    errors: &mut FieldErrors,
) {
    if let Some(email) = email
        && !email.is_empty()
    {
        if email.chars().count() > EMAIL_MAX_CHARS {
            errors.add(
                "email",
                format!("Ensure this field has no more than {EMAIL_MAX_CHARS} characters."),
            );
        } else if !valid_email(email) {
            errors.add("email", "Enter a valid email address.");
        }
    }

    for (field, value) in [("first_name", first_name), ("last_name", last_name)] {
        if let Some(value) = value
            && value.chars().count() > NAME_MAX_CHARS
        {
            errors.add(
                field,
                format!("Ensure this field has no more than {NAME_MAX_CHARS} characters."),
            );
        }
    }
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|err| {
            tracing::error!("Password hashing task failed: {err}");
            ApiError::Internal
        })?
        .map_err(|err| {
            tracing::error!("Error hashing password: {err}");
            ApiError::Internal
        })
}

async fn verify_password(password: String, stored_hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &stored_hash))
        .await
        .map_err(|err| {
            tracing::error!("Password verification task failed: {err}");
            ApiError::Internal
        })?
        .map_err(|err| {
            tracing::error!("Error verifying password: {err}");
            ApiError::Internal
        })
}

/// Check `password` against `user`, or against a stand-in hash when there is no
/// such account. Either way exactly one Argon2 verification runs.
async fn check_credentials(user: Option<User>, password: String) -> Result<Option<User>, ApiError> {
    let Some(user) = user else {
        tokio::task::spawn_blocking(move || password::verify_dummy_password(&password))
            .await
            .map_err(|err| {
                tracing::error!("Password verification task failed: {err}");
                ApiError::Internal
            })?;
        return Ok(None);
    };

    let stored_hash = user.password_hash.clone();
    if verify_password(password, stored_hash).await? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}
