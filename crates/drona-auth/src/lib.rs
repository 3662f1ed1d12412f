//! Authentication and session coherence: token signing, password hashing,
//! the single-active-session login/refresh/logout flows, and the bearer
//! authorizer that guards every submission-creating endpoint.

mod authorize;
mod flows;
mod password;
mod token;

use thiserror::Error;

pub use authorize::{AuthedUser, Authorizer};
pub use flows::{AccessGrant, AuthFlows, LoginGrant};
pub use password::{hash_password, verify_password};
pub use token::{refresh_token_fingerprint, Claims, TokenKind, TokenSigner};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad credentials, bad token, missing or inactive user. No side effects.
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    /// The session was superseded or force-logged-out; the client must log
    /// in again.
    #[error("session expired")]
    SessionExpired,

    #[error("password hashing failed")]
    PasswordHash,

    #[error("token encoding failed: {0}")]
    TokenEncoding(#[source] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Kv(#[from] drona_kv::KvError),

    #[error(transparent)]
    Store(#[from] drona_store::StoreError),
}
