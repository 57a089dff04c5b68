//! User-account storage.
//!
//! Handlers and CLI actions never reach for a global connection: the process
//! builds one [`SharedStore`] from the DSN at startup and passes it down.
//!
//! - `postgres://` / `postgresql://` DSNs select [`PgUserStore`].
//! - `memory://` selects [`MemoryUserStore`], an ephemeral store that lives as
//!   long as the process (local development and tests).

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// A registered account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// Fields required to create an account. The password is already hashed.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// Allow-listed profile changes; `None` leaves the column untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileUpdate {
    fn apply(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        if let Some(first_name) = &self.first_name {
            user.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &self.last_name {
            user.last_name.clone_from(last_name);
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user with username {0:?} already exists")]
    Conflict(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Short backend name used in logs and spans.
    fn backend(&self) -> &'static str;

    /// Insert a new account, failing with [`StoreError::Conflict`] if the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Apply a profile update and return the updated account, or `None` if it no longer exists.
    async fn update_profile(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError>;

    /// Enable or disable an account; returns `None` if it does not exist.
    /// Inactive accounts cannot log in, refresh, or use issued access tokens.
    async fn set_active(&self, id: i64, active: bool) -> Result<Option<User>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Remove every account. Returns the number of deleted records.
    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn UserStore>;

/// Open the store named by `dsn`.
///
/// # Errors
/// Returns an error if the DSN is malformed, uses an unsupported scheme, or the
/// database cannot be reached.
pub async fn connect(dsn: &str) -> Result<SharedStore> {
    let parsed = Url::parse(dsn).context("Invalid DSN")?;

    match parsed.scheme() {
        "memory" => Ok(Arc::new(MemoryUserStore::new())),
        "postgres" | "postgresql" => {
            let store = PgUserStore::connect(dsn).await?;
            Ok(Arc::new(store))
        }
        scheme => Err(anyhow!("Unsupported DSN scheme: {scheme}")),
    }
}
