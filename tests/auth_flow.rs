use auth_manager::auth::refresh_token_digest;
use auth_manager::config::AuthConfig;
use auth_manager::{
    AppError, AuthService, ConfigManagerApi, MemoryCredentialStore, MemorySessionCache, NewUser,
    ReferenceClaims, SessionCache, TokenSigner,
};
use auth_manager::error::AuthError;
use serde_json::json;
use std::sync::Arc;

const ACCESS_SECRET: &str = "test_access_secret";
const REFRESH_SECRET: &str = "test_refresh_secret";

fn auth_config() -> AuthConfig {
    AuthConfig {
        access_token_secret: ACCESS_SECRET.to_string(),
        access_token_ttl_secs: 60,
        refresh_token_secret: REFRESH_SECRET.to_string(),
        refresh_token_ttl_secs: 3600,
    }
}

fn setup() -> (AuthService, Arc<MemorySessionCache>) {
    let store = Arc::new(MemoryCredentialStore::new());
    let cache = Arc::new(MemorySessionCache::new());
    let config_api = Arc::new(
        ConfigManagerApi::new(&auth_manager::config::ConfigManagerConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 1,
        })
        .unwrap(),
    );
    let service = AuthService::new(store, cache.clone(), config_api, auth_config());
    (service, cache)
}

#[test_log::test(tokio::test)]
async fn test_signin_returns_tokens_and_records_session() {
    let (service, cache) = setup();
    service
        .signup(NewUser::new("alice", "correct", "admin"))
        .await
        .unwrap();

    let pair = service.signin("alice", "correct", None).await.unwrap();
    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());
    assert_ne!(pair.access_token, pair.refresh_token);

    let entry = cache.get("alice").await.unwrap().expect("session entry");
    assert_eq!(entry.refresh_token_hash, refresh_token_digest(&pair.refresh_token));
}

#[test_log::test(tokio::test)]
async fn test_signin_rejects_bad_credentials_without_session_write() {
    let (service, cache) = setup();
    service
        .signup(NewUser::new("alice", "correct", "admin"))
        .await
        .unwrap();

    let err = service.signin("alice", "wrong", None).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::CredentialMismatch)));

    let err = service.signin("mallory", "correct", None).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::CredentialMismatch)));

    assert!(cache.get("alice").await.unwrap().is_none());
    assert!(cache.get("mallory").await.unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn test_token_pair_shares_claims_but_not_expiry() {
    let (service, _cache) = setup();
    service
        .signup(
            NewUser::new("alice", "correct", "admin").with_claims(json!({"team": "core"})),
        )
        .await
        .unwrap();

    let reference = ReferenceClaims {
        service_id: "svc-42".to_string(),
        result: json!({"resolved": true}),
    };
    let pair = service
        .signin("alice", "correct", Some(reference.clone()))
        .await
        .unwrap();

    let access = TokenSigner::decode(&pair.access_token, ACCESS_SECRET).unwrap();
    let refresh = TokenSigner::decode(&pair.refresh_token, REFRESH_SECRET).unwrap();

    assert_eq!(access.sub, refresh.sub);
    assert_eq!(access.role, refresh.role);
    assert_eq!(access.claims, refresh.claims);
    assert_eq!(access.claims, json!({"team": "core"}));
    assert_eq!(access.reference.as_ref(), Some(&reference));
    assert_eq!(refresh.reference.as_ref(), Some(&reference));

    // Same issue, different lifetimes
    assert_eq!(access.exp - access.iat, 60);
    assert_eq!(refresh.exp - refresh.iat, 3600);
    assert!(refresh.exp > access.exp);

    // Each class verifies only under its own secret
    assert!(TokenSigner::decode(&pair.access_token, REFRESH_SECRET).is_err());
}

#[test_log::test(tokio::test)]
async fn test_second_signin_wins() {
    let (service, cache) = setup();
    service
        .signup(NewUser::new("alice", "correct", "admin"))
        .await
        .unwrap();

    let first = service.signin("alice", "correct", None).await.unwrap();
    let second = service.signin("alice", "correct", None).await.unwrap();
    assert_ne!(first.refresh_token, second.refresh_token);

    let entry = cache.get("alice").await.unwrap().expect("session entry");
    assert_eq!(entry.refresh_token_hash, refresh_token_digest(&second.refresh_token));
    assert_ne!(entry.refresh_token_hash, refresh_token_digest(&first.refresh_token));
}

#[test_log::test(tokio::test)]
async fn test_logout_is_idempotent() {
    let (service, cache) = setup();
    service
        .signup(NewUser::new("alice", "correct", "admin"))
        .await
        .unwrap();
    service.signin("alice", "correct", None).await.unwrap();

    service.logout("alice").await.unwrap();
    assert!(cache.get("alice").await.unwrap().is_none());

    // Second logout of the same username is a no-op
    service.logout("alice").await.unwrap();
    // So is logging out a username that never signed in
    service.logout("bob").await.unwrap();
}

#[test_log::test(tokio::test)]
async fn test_duplicate_signup_rejected() {
    let (service, _cache) = setup();
    service
        .signup(NewUser::new("alice", "correct", "admin"))
        .await
        .unwrap();

    let err = service
        .signup(NewUser::new("alice", "other", "member"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Store(auth_manager::error::StoreError::Duplicate)
    ));
}
