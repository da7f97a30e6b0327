//! In-memory user store
//!
//! Enforces the same unique username/email rules as the `users` table.

use super::{RepositoryError, RepositoryResult, UserStore};
use async_trait::async_trait;
use auth_service_shared::User;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolClosed)
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, user: &User) -> RepositoryResult<()> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Duplicate("username"));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Duplicate("email"));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
