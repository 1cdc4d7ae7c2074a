//! Credential store collaborators
//!
//! Defines the store contract the auth workflow depends on, plus the
//! Postgres implementation and an in-memory one for development and tests.

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryCredentialStore;
pub use models::{NewUser, UserRecord};
pub use postgres::PgCredentialStore;

use async_trait::async_trait;

use crate::Result;

/// Persists user records. Implementations hash the signup password and
/// enforce username uniqueness.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create a user record, hashing the supplied password.
    async fn signup(&self, new_user: NewUser) -> Result<UserRecord>;

    /// Fetch a record by username, `None` when absent.
    async fn lookup(&self, username: &str) -> Result<Option<UserRecord>>;
}
