//! Authentication configuration.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::Deserialize;

pub use jsonwebtoken::Algorithm as SigningAlgorithm;

use crate::error::AuthError;
use crate::token::Purpose;

/// Issuer literal shared by every Robin service.
pub const DEFAULT_ISSUER: &str = "Robin-Servico-Auth";

/// SHA-256 hex digest of the historical default admin password.
pub const DEFAULT_ADMIN_PASSWORD_HASH: &str =
    "027aede4e00bfe45724dc54c740fa6d57109dc1ba661edf99f93728f6c7371e4";

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 366 * 24 * 3600;

/// HMAC algorithms a credential may be signed with.
pub const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Configuration for credential issuance, verification and bootstrap.
///
/// Every verifying service must load byte-identical `jwt_secret`
/// material; a mismatch is not detected at runtime, tokens minted
/// elsewhere simply fail verification.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Shared HMAC secret.
    pub jwt_secret: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Algorithm used when minting. Must be an HMAC algorithm.
    pub signing_algorithm: SigningAlgorithm,
    /// Session token lifetime in seconds (default: 32_400 = 9 hours).
    pub session_token_lifetime_secs: u64,
    /// Re-authentication token lifetime in seconds (default: 2_400 = 40 minutes).
    pub reauth_token_lifetime_secs: u64,
    /// Username of the bootstrapped administrative identity.
    pub admin_username: String,
    /// Stored credential hash for the bootstrapped admin.
    pub admin_password_hash: String,
    /// Upper bound on a single user store call, in milliseconds.
    pub store_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: DEFAULT_ISSUER.into(),
            signing_algorithm: Algorithm::HS512,
            session_token_lifetime_secs: 32_400,
            reauth_token_lifetime_secs: 2_400,
            admin_username: "admin".into(),
            admin_password_hash: DEFAULT_ADMIN_PASSWORD_HASH.into(),
            store_timeout_ms: 5_000,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("signing_algorithm", &self.signing_algorithm)
            .field("session_token_lifetime_secs", &self.session_token_lifetime_secs)
            .field("reauth_token_lifetime_secs", &self.reauth_token_lifetime_secs)
            .field("admin_username", &self.admin_username)
            .field("admin_password_hash", &"<redacted>")
            .field("store_timeout_ms", &self.store_timeout_ms)
            .finish()
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.is_empty() {
            return Err(AuthError::Config("jwt_secret must not be empty".into()));
        }
        if self.jwt_issuer.is_empty() {
            return Err(AuthError::Config("jwt_issuer must not be empty".into()));
        }
        if !HMAC_ALGORITHMS.contains(&self.signing_algorithm) {
            return Err(AuthError::Config(format!(
                "signing_algorithm must be HS256, HS384 or HS512, got {:?}",
                self.signing_algorithm
            )));
        }
        if self.session_token_lifetime_secs == 0 || self.reauth_token_lifetime_secs == 0 {
            return Err(AuthError::Config("token lifetimes must be positive".into()));
        }
        if self.session_token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS
            || self.reauth_token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS
        {
            return Err(AuthError::Config(format!(
                "token lifetimes must not exceed {MAX_TOKEN_LIFETIME_SECS}s"
            )));
        }
        if self.admin_username.is_empty() {
            return Err(AuthError::Config("admin_username must not be empty".into()));
        }
        Ok(())
    }

    /// Configured lifetime for tokens of the given purpose.
    pub fn lifetime(&self, purpose: Purpose) -> Duration {
        match purpose {
            Purpose::Session => Duration::from_secs(self.session_token_lifetime_secs),
            Purpose::Reauth => Duration::from_secs(self.reauth_token_lifetime_secs),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AuthConfig {
        AuthConfig {
            jwt_secret: "s3cret".into(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_need_only_a_secret() {
        assert!(valid().validate().is_ok());
        assert!(matches!(
            AuthConfig::default().validate(),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn rejects_non_hmac_signing_algorithm() {
        let config = AuthConfig {
            signing_algorithm: Algorithm::RS256,
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_lifetime() {
        let config = AuthConfig {
            reauth_token_lifetime_secs: 0,
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unbounded_lifetime() {
        let config = AuthConfig {
            session_token_lifetime_secs: 10_000_000_000_000,
            ..valid()
        };
        assert!(matches!(config.validate(), Err(AuthError::Config(_))));

        let at_cap = AuthConfig {
            reauth_token_lifetime_secs: MAX_TOKEN_LIFETIME_SECS,
            ..valid()
        };
        assert!(at_cap.validate().is_ok());
    }

    #[test]
    fn lifetime_is_per_purpose() {
        let config = valid();
        assert_eq!(config.lifetime(Purpose::Session), Duration::from_secs(9 * 3600));
        assert_eq!(config.lifetime(Purpose::Reauth), Duration::from_secs(40 * 60));
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains(DEFAULT_ADMIN_PASSWORD_HASH));
    }
}
