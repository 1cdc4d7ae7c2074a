use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::Result;

/// Result stashed into the token by an upstream caller, keyed by its own
/// service identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceClaims {
    pub service_id: String,
    pub result: Value,
}

/// Claims payload built per signin call. Never persisted; both token
/// classes are signed from the same payload.
#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub username: String,
    pub role: String,
    pub claims: Value,
    pub reference: Option<ReferenceClaims>,
}

/// Wire form of a signed token's payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    pub role: String,
    pub claims: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceClaims>,
    /// Unique token id; makes back-to-back issues distinct
    pub jti: String,
    /// Issued at (UTC timestamp)
    pub iat: i64,
    /// Expiration time (UTC timestamp)
    pub exp: i64,
}

/// Stateless HS256 signer. TTL and secret are per token class, so access
/// and refresh tokens stay independently rotatable.
pub struct TokenSigner;

impl TokenSigner {
    pub fn sign(payload: &SessionClaims, ttl: Duration, secret: &str) -> Result<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: payload.username.clone(),
            role: payload.role.clone(),
            claims: payload.claims.clone(),
            reference: payload.reference.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Decode and validate a token. Expiry is checked here, without
    /// calling back into the issuing workflow.
    pub fn decode(token: &str, secret: &str) -> Result<TokenClaims> {
        let data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(data.claims)
    }
}
