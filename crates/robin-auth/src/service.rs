//! Authentication service — login, registration, re-authentication and
//! account administration over a [`UserRecordStore`].

use std::time::Duration;

use robin_core::error::{RobinError, RobinResult};
use robin_core::models::tier::Tier;
use robin_core::models::user::UserRecord;
use robin_core::repository::UserRecordStore;
use tracing::{info, warn};

use crate::bootstrap;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::store;
use crate::token::{Claims, Purpose, TokenIssuer};
use crate::verifier::{TokenVerifier, Verdict};

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed session credential.
    pub token: String,
    /// Tier embedded in the credential.
    pub tier: Tier,
    /// Credential lifetime in seconds.
    pub expires_in: u64,
}

/// Input for creating a new basic-tier user.
#[derive(Debug)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
}

/// Changes an administrator may apply to an existing user. `None`
/// leaves the field as it is.
#[derive(Debug, Default)]
pub struct UpdateUserInput {
    pub password: Option<String>,
    pub tier: Option<Tier>,
}

/// State of the caller's session credential.
#[derive(Debug)]
pub struct SessionStatus {
    pub claims: Claims,
    /// Whether this credential is the last one issued to the subject.
    /// Informational only; older credentials stay valid until expiry.
    pub current: bool,
}

/// Authentication service.
///
/// Generic over the store implementation so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<S: UserRecordStore> {
    store: S,
    config: AuthConfig,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
}

impl<S: UserRecordStore> AuthService<S> {
    pub fn new(store: S, config: AuthConfig) -> Result<Self, AuthError> {
        let issuer = TokenIssuer::new(&config)?;
        let verifier = TokenVerifier::new(&config)?;
        Ok(Self {
            store,
            config,
            issuer,
            verifier,
        })
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// See [`bootstrap::ensure_admin_exists`].
    pub async fn ensure_admin_exists(&self) -> Result<bool, AuthError> {
        bootstrap::ensure_admin_exists(&self.store, &self.config).await
    }

    /// Check a username/password pair and issue a session credential.
    ///
    /// Unknown users and wrong passwords fail identically. A store
    /// failure or timeout fails the attempt.
    pub async fn login(&self, input: LoginInput) -> RobinResult<LoginOutput> {
        // 1. Look up user.
        let Some(user) = self.load(&input.username).await? else {
            info!(username = %input.username, "login rejected: unknown user");
            return Err(AuthError::InvalidCredentials.into());
        };

        // 2. Verify password.
        match password::verify_password(&input.password, &user.credential_hash) {
            Ok(true) => {}
            Ok(false) => {
                info!(username = %input.username, "login rejected: wrong password");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => {
                warn!(username = %input.username, error = %e, "stored credential hash is unusable");
                return Err(AuthError::InvalidCredentials.into());
            }
        }

        // 3. Issue session credential.
        let output = self.start_session(&input.username, user).await?;
        info!(username = %input.username, tier = output.tier.code(), "login succeeded");
        Ok(output)
    }

    /// Create a basic-tier user. The caller must present an admin
    /// session credential.
    pub async fn register(&self, admin_token: &str, input: RegisterInput) -> RobinResult<UserRecord> {
        let admin = self.verifier.admin_claims(admin_token)?;

        let username = input.username.trim();
        if username.is_empty() {
            return Err(RobinError::Validation {
                message: "username must not be empty".into(),
            });
        }
        if input.password.is_empty() {
            return Err(RobinError::Validation {
                message: "password must not be empty".into(),
            });
        }

        let record = UserRecord::new(username, password::hash_password(&input.password)?, Tier::User);
        let created = store::bounded(
            self.config.store_timeout(),
            self.store.put_if_absent(username, &record, Duration::ZERO),
        )
        .await?;
        if !created {
            return Err(AuthError::UserExists.into());
        }

        info!(username, registered_by = %admin.subject, "registered user");
        Ok(record)
    }

    /// Whether `username` has a record. Admin only.
    pub async fn user_exists(&self, admin_token: &str, username: &str) -> RobinResult<bool> {
        self.verifier.admin_claims(admin_token)?;
        Ok(self.load(username).await?.is_some())
    }

    /// Verify a session credential and report whether it is still the
    /// one cached on the subject's record.
    pub async fn session_status(&self, session_token: &str) -> RobinResult<SessionStatus> {
        let claims = self.verifier.session_claims(session_token)?;
        let current = self
            .load(&claims.subject)
            .await?
            .and_then(|user| user.last_issued_token)
            .is_some_and(|cached| cached == session_token);

        Ok(SessionStatus { claims, current })
    }

    /// Change the password and/or tier of an existing user. Admin only.
    ///
    /// Credentials already issued keep their tier snapshot until they
    /// expire; the new tier applies from the next issuance.
    pub async fn update_user(
        &self,
        admin_token: &str,
        username: &str,
        input: UpdateUserInput,
    ) -> RobinResult<UserRecord> {
        let admin = self.verifier.admin_claims(admin_token)?;

        if input.password.is_none() && input.tier.is_none() {
            return Err(RobinError::Validation {
                message: "nothing to update".into(),
            });
        }
        if input.password.as_deref().is_some_and(str::is_empty) {
            return Err(RobinError::Validation {
                message: "password must not be empty".into(),
            });
        }
        if input.tier == Some(Tier::Root) {
            return Err(RobinError::Validation {
                message: "the root tier cannot be granted".into(),
            });
        }

        let mut user = self
            .load(username)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(username.to_string()))?;
        if let Some(password) = &input.password {
            user.credential_hash = password::hash_password(password)?;
        }
        if let Some(tier) = input.tier {
            user.tier = tier;
        }

        let replaced = store::bounded(
            self.config.store_timeout(),
            self.store.replace(username, &user),
        )
        .await?;
        if !replaced {
            return Err(AuthError::UserNotFound(username.to_string()).into());
        }

        info!(
            username,
            updated_by = %admin.subject,
            password_changed = input.password.is_some(),
            tier = user.tier.code(),
            "updated user"
        );
        Ok(user)
    }

    /// Remove a user. Admin only; an administrator cannot delete the
    /// account they are signed in as.
    pub async fn delete_user(&self, admin_token: &str, username: &str) -> RobinResult<()> {
        let admin = self.verifier.admin_claims(admin_token)?;
        if admin.is_subject(username) {
            return Err(RobinError::Validation {
                message: "cannot delete the signed-in account".into(),
            });
        }

        let removed = store::bounded(self.config.store_timeout(), self.store.delete(username)).await?;
        if !removed {
            return Err(AuthError::UserNotFound(username.to_string()).into());
        }

        info!(username, deleted_by = %admin.subject, "deleted user");
        Ok(())
    }

    /// Mint a re-authentication credential for the holder of a valid
    /// session credential. The tier is re-read from the store.
    pub async fn issue_reauth(&self, session_token: &str) -> RobinResult<String> {
        let claims = self.verifier.session_claims(session_token)?;
        let user = self
            .load(&claims.subject)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(self.issuer.issue(&user, Purpose::Reauth)?)
    }

    /// Exchange a valid re-authentication credential for a fresh
    /// session credential. The tier is re-read from the store.
    pub async fn reauthenticate(&self, reauth_token: &str) -> RobinResult<LoginOutput> {
        let claims = self.verifier.reauth_claims(reauth_token)?;
        let user = self
            .load(&claims.subject)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.start_session(&claims.subject, user).await
    }

    /// Session verdict for a caller that must also be `owner`, e.g. the
    /// author of the record being modified.
    pub fn authorize_owner(&self, token: &str, owner: &str) -> Verdict {
        self.verifier
            .session_claims(token)
            .and_then(|claims| {
                if claims.is_subject(owner) {
                    Ok(claims)
                } else {
                    Err(AuthError::NotOwner)
                }
            })
            .into()
    }

    /// Fetch the record stored under `username`.
    ///
    /// The store key is the identity. A record without a `user` field
    /// takes the key; one naming a different user is treated as absent.
    async fn load(&self, username: &str) -> Result<Option<UserRecord>, AuthError> {
        if username.is_empty() {
            return Ok(None);
        }
        let Some(mut user) =
            store::bounded(self.config.store_timeout(), self.store.get(username)).await?
        else {
            return Ok(None);
        };

        if user.username.is_empty() {
            user.username = username.to_string();
        } else if user.username != username {
            warn!(
                key = username,
                stored = %user.username,
                "user record names a different user, ignoring it"
            );
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Issue a session credential for the record stored under
    /// `username` and cache it there.
    async fn start_session(&self, username: &str, user: UserRecord) -> RobinResult<LoginOutput> {
        let token = self.issuer.issue(&user, Purpose::Session)?;

        match store::bounded(
            self.config.store_timeout(),
            self.store.set_cached_token(username, &token),
        )
        .await
        {
            Ok(true) => {}
            Ok(false) => warn!(username, "user record vanished before the token was cached"),
            Err(e) => warn!(username, error = %e, "failed to cache issued token"),
        }

        Ok(LoginOutput {
            token,
            tier: user.tier,
            expires_in: self.config.session_token_lifetime_secs,
        })
    }
}
