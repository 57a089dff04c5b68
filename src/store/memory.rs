use super::{NewUser, ProfileUpdate, StoreError, User, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    users: BTreeMap<i64, User>,
}

/// Process-local store; contents vanish on exit.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    state: RwLock<State>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(user.username));
        }

        state.next_id += 1;
        let created = User {
            id: state.next_id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            is_active: true,
            date_joined: Utc::now(),
        };
        state.users.insert(created.id, created.clone());

        debug!(user_id = created.id, "user created");

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&id).map(|user| {
            update.apply(user);
            user.clone()
        }))
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&id).map(|user| {
            user.is_active = active;
            user.clone()
        }))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.state.read().await.users.len() as u64)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let deleted = state.users.len() as u64;
        state.users.clear();
        Ok(deleted)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
