use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("Session cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Upstream config error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::Store(StoreError::NotFound),
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Store(StoreError::Duplicate)
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::Store(StoreError::Connection(err.to_string()))
            }
            _ => AppError::Store(StoreError::Query(err.to_string())),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Auth(AuthError::TokenEncoding(err.to_string()))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(UpstreamError::Request(err.to_string()))
    }
}

/// Signin/token failures. `CredentialMismatch` deliberately carries no
/// detail about which factor failed.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("username/password does not match")]
    CredentialMismatch,

    #[error("Token encoding failed: {0}")]
    TokenEncoding(String),

    #[error("Password hash invalid: {0}")]
    HashFormat(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record")]
    Duplicate,
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Config Manager collaborator failures. Surfaced to callers as a generic
/// "cannot process" rejection; the wrapped detail is for logging only.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Upstream returned status {0}: {1}")]
    Status(u16, String),
}
