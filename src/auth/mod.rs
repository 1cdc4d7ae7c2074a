//! Authentication workflow
//!
//! Credential verification, token issuance, and cached refresh-token
//! revocation.

mod password;
mod service;
mod token;

pub use password::{hash_password, verify_password};
pub use service::{refresh_token_digest, AuthService, TokenPair};
pub use token::{ReferenceClaims, SessionClaims, TokenClaims, TokenSigner};
