//! Credential claims and issuance.
//!
//! A credential is a compact HMAC-signed JWT whose payload carries
//! exactly `user`, `perms`, `iss`, `exp` and, for re-authentication
//! tokens only, `typ = "reauth"`.

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use robin_core::models::tier::Tier;
use robin_core::models::user::UserRecord;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// What a credential may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// General bearer credential. Serialized by omitting `typ`.
    #[default]
    Session,
    /// Narrow re-authentication credential, `typ = "reauth"`.
    Reauth,
}

impl Purpose {
    pub fn is_session(&self) -> bool {
        matches!(self, Purpose::Session)
    }
}

/// Decoded credential payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Subject — the username.
    #[serde(rename = "user")]
    pub subject: String,
    /// Tier snapshot taken at issuance.
    #[serde(rename = "perms")]
    pub tier: Tier,
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Expiration (Unix timestamp).
    #[serde(rename = "exp")]
    pub expires_at: i64,
    #[serde(rename = "typ", default, skip_serializing_if = "Purpose::is_session")]
    pub purpose: Purpose,
}

impl Claims {
    /// Whether this credential was issued to `username`. Only
    /// meaningful once the credential has passed verification.
    pub fn is_subject(&self, username: &str) -> bool {
        self.subject == username
    }
}

/// Mints signed credentials with the shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    algorithm: Algorithm,
    issuer: String,
    session_lifetime: chrono::Duration,
    reauth_lifetime: chrono::Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;
        Ok(Self {
            key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            algorithm: config.signing_algorithm,
            issuer: config.jwt_issuer.clone(),
            session_lifetime: lifetime_secs(config.session_token_lifetime_secs)?,
            reauth_lifetime: lifetime_secs(config.reauth_token_lifetime_secs)?,
        })
    }

    pub fn lifetime(&self, purpose: Purpose) -> chrono::Duration {
        match purpose {
            Purpose::Session => self.session_lifetime,
            Purpose::Reauth => self.reauth_lifetime,
        }
    }

    /// Issue a credential for `user` valid from now.
    pub fn issue(&self, user: &UserRecord, purpose: Purpose) -> Result<String, AuthError> {
        self.issue_at(user, purpose, Utc::now())
    }

    /// Issue a credential for `user` as if the current time were `now`.
    pub fn issue_at(
        &self,
        user: &UserRecord,
        purpose: Purpose,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let expires_at = now
            .checked_add_signed(self.lifetime(purpose))
            .ok_or_else(|| AuthError::Config(format!("expiry overflows the clock at {now}")))?;
        let claims = Claims {
            subject: user.username.clone(),
            tier: user.tier,
            issuer: self.issuer.clone(),
            expires_at: expires_at.timestamp(),
            purpose,
        };

        jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.key)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
    }
}

fn lifetime_secs(secs: u64) -> Result<chrono::Duration, AuthError> {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| AuthError::Config(format!("token lifetime out of range: {secs}s")))
}
