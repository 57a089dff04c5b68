use anyhow::Result;
use core_service::{
    cli::actions::delete_users::{SUCCESS_MESSAGE, purge},
    store::{self, NewUser, UserStore},
};

fn account(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: "not-a-real-hash".to_string(),
    }
}

#[tokio::test]
async fn five_accounts_then_purge() -> Result<()> {
    let store = store::connect("memory://").await?;
    for username in ["ana", "ben", "cy", "dee", "eli"] {
        store.create_user(account(username)).await?;
    }
    assert_eq!(store.count().await?, 5);

    let mut out = Vec::new();
    let deleted = purge(store.as_ref(), &mut out).await?;

    assert_eq!(deleted, 5);
    assert_eq!(store.count().await?, 0);
    assert_eq!(String::from_utf8(out)?, format!("{SUCCESS_MESSAGE}\n"));
    Ok(())
}

#[tokio::test]
async fn purge_twice_is_harmless() -> Result<()> {
    let store = store::connect("memory://").await?;
    store.create_user(account("ana")).await?;

    let mut out = Vec::new();
    purge(store.as_ref(), &mut out).await?;
    let deleted = purge(store.as_ref(), &mut out).await?;

    assert_eq!(deleted, 0);
    assert_eq!(
        String::from_utf8(out)?,
        "Users deletion completed.\nUsers deletion completed.\n"
    );
    Ok(())
}

#[tokio::test]
async fn accounts_can_be_created_after_purge() -> Result<()> {
    let store = store::connect("memory://").await?;
    let first = store.create_user(account("ana")).await?;

    purge(store.as_ref(), &mut std::io::sink()).await?;

    let again = store.create_user(account("ana")).await?;
    assert!(again.id > first.id);
    assert_eq!(store.count().await?, 1);
    Ok(())
}
