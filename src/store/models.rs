use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted user. The store owns the record lifecycle; the auth
/// workflow only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub claims: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(username: String, password_hash: String, role: String, claims: Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            role,
            claims,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Signup input. The password is plaintext here; hashing happens inside
/// the credential store so signin verification shares its parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: String,
    #[serde(default = "default_claims")]
    pub claims: Value,
}

fn default_claims() -> Value {
    Value::Object(serde_json::Map::new())
}

impl NewUser {
    pub fn new(username: &str, password: &str, role: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            role: role.to_string(),
            claims: default_claims(),
        }
    }

    pub fn with_claims(mut self, claims: Value) -> Self {
        self.claims = claims;
        self
    }
}
