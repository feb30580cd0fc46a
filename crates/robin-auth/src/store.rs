//! Bounded access to the user store.

use std::time::Duration;

use robin_core::error::RobinResult;

use crate::error::AuthError;

/// Await a store call for at most `timeout`. Both a store error and an
/// elapsed deadline surface as [`AuthError::StoreUnavailable`], so a
/// slow store can never be mistaken for a successful lookup.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = RobinResult<T>>,
) -> Result<T, AuthError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(AuthError::StoreUnavailable(e.to_string())),
        Err(_) => Err(AuthError::StoreUnavailable(format!(
            "no response within {}ms",
            timeout.as_millis()
        ))),
    }
}
