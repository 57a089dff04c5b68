use super::{NewUser, ProfileUpdate, StoreError, User, UserStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    Connection, PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};
use std::time::Duration;
use tracing::{Instrument, Span, debug, info_span};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, is_active, date_joined";

/// PostgreSQL-backed account store.
#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Connect to the database and make sure the `users` table exists.
    ///
    /// # Errors
    /// Returns an error if the connection or schema setup fails.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;

        let store = Self::from_pool(pool);
        store.apply_schema().await?;

        Ok(store)
    }

    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn apply_schema(&self) -> Result<()> {
        for (index, statement) in split_sql_statements(SCHEMA_SQL).iter().enumerate() {
            sqlx::query(statement)
                .execute(&self.pool)
                .instrument(query_span("CREATE", statement))
                .await
                .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
        }

        debug!("users schema applied");

        Ok(())
    }
}

fn query_span(operation: &str, statement: &str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        password_hash: row.try_get("password_hash")?,
        is_active: row.try_get("is_active")?,
        date_joined: row.try_get("date_joined")?,
    })
}

fn map_insert_error(err: sqlx::Error, username: &str) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(username.to_string())
        }
        other => StoreError::Database(other),
    }
}

/// Split a schema file into statements. Assumes each statement ends with `;`
/// at the end of a line and that no statement nests semicolons.
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

#[async_trait]
impl UserStore for PgUserStore {
    fn backend(&self) -> &'static str {
        "postgresql"
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users (username, email, first_name, last_name, password_hash) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", &query))
            .await
            .map_err(|err| map_insert_error(err, &user.username))?;

        Ok(user_from_row(&row)?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn update_profile(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        let query = format!(
            "UPDATE users SET email = COALESCE($2, email), \
             first_name = COALESCE($3, first_name), \
             last_name = COALESCE($4, last_name) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(update.email)
            .bind(update.first_name)
            .bind(update.last_name)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", &query))
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<Option<User>, StoreError> {
        let query = format!("UPDATE users SET is_active = $2 WHERE id = $1 RETURNING {USER_COLUMNS}");
        let row = sqlx::query(&query)
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", &query))
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let query = "SELECT COUNT(*) AS count FROM users";
        let row = sqlx::query(query)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;
        let count: i64 = row.try_get("count")?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let query = "DELETE FROM users";
        let result = sqlx::query(query)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }
}
