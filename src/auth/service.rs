use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Duration;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::password::verify_password;
use crate::auth::token::{ReferenceClaims, SessionClaims, TokenSigner};
use crate::cache::{SessionCache, SessionEntry};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::remote::ConfigManagerApi;
use crate::store::{CredentialStore, NewUser, UserRecord};
use crate::Result;

/// Access/refresh pair returned by a successful signin.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// One-way digest of a refresh token, the value tracked in the session
/// cache. Exposed so a later refresh check can compare against the cached
/// marker without this workflow in the loop.
pub fn refresh_token_digest(token: &str) -> String {
    BASE64.encode(Sha256::digest(token.as_bytes()))
}

// Verified against when a signin names an unknown user, so a lookup miss
// costs a verification too. Hash of an unguessable throwaway input.
const FALLBACK_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    cache: Arc<dyn SessionCache>,
    config_api: Arc<ConfigManagerApi>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        cache: Arc<dyn SessionCache>,
        config_api: Arc<ConfigManagerApi>,
        config: AuthConfig,
    ) -> Self {
        Self {
            store,
            cache,
            config_api,
            config,
        }
    }

    /// Forward user creation to the credential store; the store hashes the
    /// password and enforces username uniqueness.
    pub async fn signup(&self, new_user: NewUser) -> Result<UserRecord> {
        let username = new_user.username.clone();
        let record = self.store.signup(new_user).await?;
        info!("Signup completed for username: {}", username);
        Ok(record)
    }

    /// Verify credentials, issue an access/refresh token pair, and record
    /// the refresh-token digest in the session cache.
    ///
    /// Lookup miss and verification failure both reject with the same
    /// generic `CredentialMismatch`; collaborator I/O failures propagate
    /// separately and are never conflated with it.
    pub async fn signin(
        &self,
        username: &str,
        password: &str,
        reference: Option<ReferenceClaims>,
    ) -> Result<TokenPair> {
        let user = match self.store.lookup(username).await? {
            Some(user) => user,
            None => {
                // Burn a verification so an unknown username takes about
                // as long as a wrong password
                let _ = verify_password(FALLBACK_HASH, password);
                warn!("Signin rejected for username: {}", username);
                return Err(AuthError::CredentialMismatch.into());
            }
        };

        if !verify_password(&user.password_hash, password)? {
            warn!("Signin rejected for username: {}", username);
            return Err(AuthError::CredentialMismatch.into());
        }

        let payload = SessionClaims {
            username: user.username.clone(),
            role: user.role.clone(),
            claims: user.claims.clone(),
            reference,
        };

        let access_token = TokenSigner::sign(
            &payload,
            Duration::seconds(self.config.access_token_ttl_secs),
            &self.config.access_token_secret,
        )?;
        let refresh_token = TokenSigner::sign(
            &payload,
            Duration::seconds(self.config.refresh_token_ttl_secs),
            &self.config.refresh_token_secret,
        )?;

        let entry = SessionEntry {
            refresh_token_hash: refresh_token_digest(&refresh_token),
        };
        self.cache
            .set(
                &user.username,
                entry,
                Duration::seconds(self.config.refresh_token_ttl_secs),
            )
            .await?;

        info!("Signin issued token pair for username: {}", user.username);
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Drop the session cache entry for a username. Idempotent; deleting
    /// an absent key is not an error.
    pub async fn logout(&self, username: &str) -> Result<()> {
        self.cache.delete(username).await?;
        info!("Logout completed for username: {}", username);
        Ok(())
    }

    /// Boundary call into the Config Manager, used to enrich signin claims
    /// with externally-resolved configuration. No retry or caching here.
    pub async fn challenge_optional_configs(
        &self,
        service_id: Option<&str>,
        config_ids: Option<&[String]>,
    ) -> Result<Option<Value>> {
        let Some(service_id) = service_id else {
            return Ok(None);
        };

        let result = match config_ids {
            Some(ids) if !ids.is_empty() => self.config_api.get_config_ids(service_id, ids).await,
            _ => self.config_api.get_service_id(service_id).await,
        };

        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                error!("Config challenge failed for service {}: {}", service_id, e);
                Err(e)
            }
        }
    }
}
