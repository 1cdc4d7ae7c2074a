use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::auth::hash_password;
use crate::error::{AppError, StoreError};
use crate::store::models::{NewUser, UserRecord};
use crate::store::CredentialStore;
use crate::Result;

/// In-memory credential store for development and tests. Shares the hash
/// parameters of the Postgres store, so signin verification behaves the
/// same against either backend.
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn signup(&self, new_user: NewUser) -> Result<UserRecord> {
        let mut users = self.users.write().await;
        if users.contains_key(&new_user.username) {
            return Err(AppError::Store(StoreError::Duplicate));
        }

        let password_hash = hash_password(&new_user.password)?;
        let record = UserRecord::new(
            new_user.username,
            password_hash,
            new_user.role,
            new_user.claims,
        );
        users.insert(record.username.clone(), record.clone());
        Ok(record)
    }

    async fn lookup(&self, username: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(username).cloned())
    }
}
