//! Store error type and Sentry integration helpers.
//!
//! Store mutations return `Result<T, StoreError>`. A rejected mutation never
//! changes state. Unexpected failures (gateway errors, timeouts) are captured
//! to Sentry via [`report`] before being surfaced to the shopper.

use thiserror::Error;

use crate::models::{CartError, SessionError};

/// Error returned when a dispatched action is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Cart invariant would be violated.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session operation not allowed in the current state.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl From<cartwheel_core::QuantityError> for StoreError {
    fn from(err: cartwheel_core::QuantityError) -> Self {
        Self::Cart(CartError::InvalidQuantity(err))
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Capture an error to Sentry and log it.
///
/// Use for failures the shopper cannot fix by changing their input.
pub fn report(err: &(dyn std::error::Error + 'static), context: &str) {
    let event_id = sentry::capture_error(err);
    tracing::error!(
        error = %err,
        sentry_event_id = %event_id,
        "{context}"
    );
}

/// Set the Sentry user context from a user ID.
///
/// Called when a user logs in so later errors are associated with them.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Called on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
