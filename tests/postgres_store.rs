//! Runs against a real database only when `CORE_SERVICE_TEST_DSN` is set.
//! The `users` table of that database is wiped.

use anyhow::Result;
use core_service::{
    cli::actions::delete_users::purge,
    store::{NewUser, PgUserStore, ProfileUpdate, StoreError, UserStore},
};

fn test_dsn() -> Option<String> {
    std::env::var("CORE_SERVICE_TEST_DSN")
        .ok()
        .filter(|dsn| !dsn.is_empty())
}

fn account(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: "not-a-real-hash".to_string(),
    }
}

#[tokio::test]
async fn postgres_store_lifecycle() -> Result<()> {
    let Some(dsn) = test_dsn() else {
        eprintln!("CORE_SERVICE_TEST_DSN not set; skipping");
        return Ok(());
    };

    let store = PgUserStore::connect(&dsn).await?;
    store.ping().await?;
    store.delete_all().await?;

    let created = store.create_user(account("pg-user")).await?;
    assert!(created.is_active);

    let duplicate = store.create_user(account("pg-user")).await;
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));

    let updated = store
        .update_profile(
            created.id,
            ProfileUpdate {
                first_name: Some("Pat".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .await?;
    assert_eq!(updated.map(|user| user.first_name), Some("Pat".to_string()));

    let disabled = store.set_active(created.id, false).await?;
    assert_eq!(disabled.map(|user| user.is_active), Some(false));

    for index in 0..4 {
        store.create_user(account(&format!("pg-user-{index}"))).await?;
    }
    assert_eq!(store.count().await?, 5);

    let mut out = Vec::new();
    assert_eq!(purge(&store, &mut out).await?, 5);
    assert_eq!(store.count().await?, 0);
    assert!(store.find_by_id(created.id).await?.is_none());
    Ok(())
}
