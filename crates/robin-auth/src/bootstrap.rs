//! First-boot guarantee of an administrative identity.

use std::time::Duration;

use robin_core::models::tier::Tier;
use robin_core::models::user::UserRecord;
use robin_core::repository::UserRecordStore;
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::store;

/// Make sure a record for the configured admin username exists,
/// creating it with the configured credential hash and the admin tier
/// if absent. Returns whether a record was created.
///
/// The insert is a conditional write, so concurrent bootstraps from
/// several instances create at most one record. A store failure is
/// returned to the caller; it should be logged, not treated as fatal.
pub async fn ensure_admin_exists<S: UserRecordStore>(
    store: &S,
    config: &AuthConfig,
) -> Result<bool, AuthError> {
    let admin = UserRecord::new(
        config.admin_username.as_str(),
        config.admin_password_hash.as_str(),
        Tier::Admin,
    );

    let created = store::bounded(
        config.store_timeout(),
        store.put_if_absent(&admin.username, &admin, Duration::ZERO),
    )
    .await
    .inspect_err(|e| warn!(username = %admin.username, error = %e, "admin bootstrap failed"))?;

    if created {
        info!(username = %admin.username, "created default admin user");
    } else {
        debug!(username = %admin.username, "admin user already present");
    }
    Ok(created)
}
