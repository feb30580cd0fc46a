//! Credential verification.
//!
//! Every check is a pure function of the presented token, the shared
//! secret and the current time. Callers only ever see a [`Verdict`];
//! the structured [`AuthError`] cause is logged at debug level.

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use robin_core::models::tier::is_admin;
use tracing::debug;

use crate::config::{AuthConfig, HMAC_ALGORITHMS};
use crate::error::{AuthError, INVALID_TOKEN_REASON};
use crate::token::{Claims, Purpose};

/// Outcome of a verification call.
///
/// `Invalid` carries a fixed human-readable reason that is identical
/// for every failure cause. Do not branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Invalid { reason: &'static str },
}

impl Verdict {
    pub fn is_ok(&self) -> bool {
        matches!(self, Verdict::Ok)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ok => f.write_str("OK"),
            Verdict::Invalid { reason } => f.write_str(reason),
        }
    }
}

impl<T> From<Result<T, AuthError>> for Verdict {
    fn from(result: Result<T, AuthError>) -> Self {
        match result {
            Ok(_) => Verdict::Ok,
            Err(_) => Verdict::Invalid {
                reason: INVALID_TOKEN_REASON,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Check {
    Session,
    Admin,
    Reauth,
}

/// Verifies credentials minted by any [`TokenIssuer`](crate::TokenIssuer)
/// sharing the same secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    issuer: String,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        // Expiry is checked against the caller-supplied clock below.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss"]);

        Ok(Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            issuer: config.jwt_issuer.clone(),
        })
    }

    /// Valid signature, unexpired, issued by us, session purpose.
    pub fn verify_session(&self, token: &str) -> Verdict {
        self.verify_session_at(token, Utc::now())
    }

    pub fn verify_session_at(&self, token: &str, now: DateTime<Utc>) -> Verdict {
        self.render(token, now, Check::Session)
    }

    /// Everything [`verify_session`](Self::verify_session) checks, plus
    /// the tier must be exactly admin.
    pub fn verify_admin(&self, token: &str) -> Verdict {
        self.verify_admin_at(token, Utc::now())
    }

    pub fn verify_admin_at(&self, token: &str, now: DateTime<Utc>) -> Verdict {
        self.render(token, now, Check::Admin)
    }

    /// Valid signature, unexpired, issued by us, re-auth purpose.
    pub fn verify_reauth(&self, token: &str) -> Verdict {
        self.verify_reauth_at(token, Utc::now())
    }

    pub fn verify_reauth_at(&self, token: &str, now: DateTime<Utc>) -> Verdict {
        self.render(token, now, Check::Reauth)
    }

    /// Decoded claims of a correctly signed, unexpired credential.
    ///
    /// Issuer and purpose are NOT checked: only trust the result after
    /// the same token has passed one of the `verify_*` calls.
    pub fn claims_of(&self, token: &str) -> Option<Claims> {
        self.claims_of_at(token, Utc::now())
    }

    pub fn claims_of_at(&self, token: &str, now: DateTime<Utc>) -> Option<Claims> {
        self.decode(token, now)
            .inspect_err(|e| debug!(error = %e, "claims extraction failed"))
            .ok()
    }

    /// Verify a session credential and return its claims.
    pub(crate) fn session_claims(&self, token: &str) -> Result<Claims, AuthError> {
        self.logged_check(token, Utc::now(), Check::Session)
    }

    /// Verify an admin session credential and return its claims.
    pub(crate) fn admin_claims(&self, token: &str) -> Result<Claims, AuthError> {
        self.logged_check(token, Utc::now(), Check::Admin)
    }

    /// Verify a re-auth credential and return its claims.
    pub(crate) fn reauth_claims(&self, token: &str) -> Result<Claims, AuthError> {
        self.logged_check(token, Utc::now(), Check::Reauth)
    }

    fn render(&self, token: &str, now: DateTime<Utc>, check: Check) -> Verdict {
        self.logged_check(token, now, check).into()
    }

    fn logged_check(&self, token: &str, now: DateTime<Utc>, check: Check) -> Result<Claims, AuthError> {
        self.check(token, now, check)
            .inspect_err(|e| debug!(?check, error = %e, "credential rejected"))
    }

    fn check(&self, token: &str, now: DateTime<Utc>, check: Check) -> Result<Claims, AuthError> {
        let claims = self.decode(token, now)?;

        if claims.issuer != self.issuer {
            return Err(AuthError::IssuerMismatch);
        }

        match check {
            Check::Session | Check::Admin if claims.purpose != Purpose::Session => {
                return Err(AuthError::PurposeMismatch);
            }
            Check::Reauth if claims.purpose != Purpose::Reauth => {
                return Err(AuthError::PurposeMismatch);
            }
            Check::Admin if !is_admin(claims.tier.code()) => {
                return Err(AuthError::InsufficientTier);
            }
            _ => {}
        }

        Ok(claims)
    }

    /// Signature, algorithm family and expiry.
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        // Refuse anything outside the HMAC family before touching the
        // signature, whatever the header claims.
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AuthError::MalformedCredential(e.to_string()))?;
        if !HMAC_ALGORITHMS.contains(&header.alg) {
            return Err(AuthError::SignatureInvalid);
        }

        let claims = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithmName
                | jsonwebtoken::errors::ErrorKind::InvalidKeyFormat => AuthError::SignatureInvalid,
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
                _ => AuthError::MalformedCredential(e.to_string()),
            })?;

        if claims.expires_at <= now.timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}
