use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::hash_password;
use crate::config::DatabaseConfig;
use crate::store::models::{NewUser, UserRecord};
use crate::store::CredentialStore;
use crate::Result;

pub struct PgCredentialStore {
    pool: Arc<PgPool>,
}

impl PgCredentialStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn signup(&self, new_user: NewUser) -> Result<UserRecord> {
        let password_hash = hash_password(&new_user.password)?;
        let record = UserRecord::new(
            new_user.username,
            password_hash,
            new_user.role,
            new_user.claims,
        );

        // Unique violation on username surfaces as StoreError::Duplicate
        let created = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, username, password_hash, role, claims, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, password_hash, role, claims, created_at, updated_at
            "#,
        )
        .bind(record.id)
        .bind(&record.username)
        .bind(&record.password_hash)
        .bind(&record.role)
        .bind(&record.claims)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(created)
    }

    async fn lookup(&self, username: &str) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, password_hash, role, claims, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }
}
