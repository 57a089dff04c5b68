//! `delete-users`: remove every account record.
//!
//! Unconditional and irreversible: no prompt, no filter, no soft delete.
//! Store errors propagate to the caller unchanged.

use crate::store::{self, UserStore};
use anyhow::{Context, Result};
use std::io::{self, Write};
use tracing::info;

pub const SUCCESS_MESSAGE: &str = "Users deletion completed.";

pub struct Args {
    pub dsn: String,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args").field("dsn", &"***").finish()
    }
}

/// Execute the delete-users action against the store named by the DSN.
/// # Errors
/// Returns an error if the store cannot be opened or the delete fails.
pub async fn execute(args: Args) -> Result<()> {
    let store = store::connect(&args.dsn)
        .await
        .context("Could not open the account store")?;

    let mut stdout = io::stdout();
    purge(store.as_ref(), &mut stdout).await?;

    Ok(())
}

/// Delete all accounts from `store`, then report success on `out`.
///
/// # Errors
/// Returns an error if the store rejects the delete or `out` cannot be written.
pub async fn purge<W: Write + Send>(store: &dyn UserStore, out: &mut W) -> Result<u64> {
    let deleted = store.delete_all().await?;

    info!(deleted, backend = store.backend(), "Users deleted");

    writeln!(out, "{SUCCESS_MESSAGE}")?;
    out.flush()?;

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryUserStore, NewUser};

    async fn seed(store: &MemoryUserStore, count: usize) -> Result<()> {
        for index in 0..count {
            store
                .create_user(NewUser {
                    username: format!("user{index}"),
                    email: String::new(),
                    first_name: String::new(),
                    last_name: String::new(),
                    password_hash: "hash".to_string(),
                })
                .await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn purge_removes_every_account() -> Result<()> {
        let store = MemoryUserStore::new();
        seed(&store, 5).await?;
        assert_eq!(store.count().await?, 5);

        let mut out = Vec::new();
        let deleted = purge(&store, &mut out).await?;

        assert_eq!(deleted, 5);
        assert_eq!(store.count().await?, 0);
        assert_eq!(String::from_utf8(out)?, "Users deletion completed.\n");
        Ok(())
    }

    #[tokio::test]
    async fn purge_on_empty_store_reports_success() -> Result<()> {
        let store = MemoryUserStore::new();

        let mut out = Vec::new();
        let deleted = purge(&store, &mut out).await?;

        assert_eq!(deleted, 0);
        assert_eq!(String::from_utf8(out)?, format!("{SUCCESS_MESSAGE}\n"));
        Ok(())
    }

    #[test]
    fn debug_redacts_dsn() {
        let args = Args {
            dsn: "postgres://admin:hunter2@db/accounts".to_string(),
        };
        assert!(!format!("{args:?}").contains("hunter2"));
    }
}
