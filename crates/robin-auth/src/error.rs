//! Authentication error types.
//!
//! The token variants are the internal cause of a rejected credential.
//! They are meant for logs; at the public boundary every one of them
//! collapses into the same opaque reason.

use robin_core::error::RobinError;
use thiserror::Error;

/// Reason text shown to callers for any rejected credential.
pub const INVALID_TOKEN_REASON: &str = "invalid or expired token";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,

    #[error("token issuer mismatch")]
    IssuerMismatch,

    #[error("token purpose mismatch")]
    PurposeMismatch,

    #[error("token tier is not admin")]
    InsufficientTier,

    #[error("token subject is not the resource owner")]
    NotOwner,

    #[error("malformed token: {0}")]
    MalformedCredential(String),

    #[error("user store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("user already exists")]
    UserExists,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("invalid auth configuration: {0}")]
    Config(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl AuthError {
    /// `true` for causes that reject a presented credential.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::SignatureInvalid
                | AuthError::Expired
                | AuthError::IssuerMismatch
                | AuthError::PurposeMismatch
                | AuthError::InsufficientTier
                | AuthError::NotOwner
                | AuthError::MalformedCredential(_)
        )
    }
}

impl From<AuthError> for RobinError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => RobinError::AuthenticationFailed {
                reason: err.to_string(),
            },
            e if e.is_token_rejection() => RobinError::AuthenticationFailed {
                reason: INVALID_TOKEN_REASON.into(),
            },
            AuthError::StoreUnavailable(msg) => RobinError::Database(msg),
            AuthError::UserExists => RobinError::AlreadyExists {
                entity: "user".into(),
            },
            AuthError::UserNotFound(id) => RobinError::NotFound {
                entity: "user".into(),
                id,
            },
            AuthError::Config(message) => RobinError::Validation { message },
            other => RobinError::Crypto(other.to_string()),
        }
    }
}
