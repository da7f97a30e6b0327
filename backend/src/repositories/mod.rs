//! Database repositories
//!
//! [`UserStore`] is the contract the auth service talks to. PostgreSQL
//! backs it in production; the in-memory store serves tests and local runs
//! without a database.

pub mod memory;
pub mod user;

use async_trait::async_trait;
use auth_service_shared::User;
use thiserror::Error;
use uuid::Uuid;

pub use memory::InMemoryUserStore;
pub use user::{PgUserRepository, UserRecord};

/// Repository error type
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A unique column already holds this value
    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence contract for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find user by username
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;

    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;

    /// Insert a new user, failing with [`RepositoryError::Duplicate`] when
    /// the username or email is taken
    async fn insert(&self, user: &User) -> RepositoryResult<()>;

    /// Check the backing store is reachable
    async fn ping(&self) -> RepositoryResult<()>;
}
