//! Session slice: the authenticated user, if any.
//!
//! Authentication is derived from the presence of an identity, so a session
//! can never claim to be authenticated without knowing who the user is.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cartwheel_core::UserId;

/// Errors raised by session mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Operation requires a logged-in user.
    #[error("no user is logged in")]
    NotAuthenticated,

    /// Shipping address is empty or whitespace.
    #[error("shipping address cannot be blank")]
    BlankAddress,
}

/// Identity recorded on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// User's account ID.
    pub id: UserId,
    /// Role assigned by the account service (e.g., "user", "admin").
    pub role: String,
    /// Saved shipping address.
    #[serde(default)]
    pub address: Option<String>,
}

impl UserIdentity {
    /// Create an identity without a saved address.
    #[must_use]
    pub fn new(id: impl Into<UserId>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            address: None,
        }
    }

    /// Set the saved shipping address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Session state owned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    user: Option<UserIdentity>,
}

impl SessionState {
    /// Create an anonymous session.
    #[must_use]
    pub const fn new() -> Self {
        Self { user: None }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|user| &user.id)
    }

    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.role.as_str())
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.user.as_ref().and_then(|user| user.address.as_deref())
    }

    /// Record a logged-in user, replacing any previous one.
    pub fn login(&mut self, identity: UserIdentity) {
        self.user = Some(identity);
    }

    /// Reset to anonymous.
    pub fn logout(&mut self) {
        self.user = None;
    }

    /// Update the logged-in user's shipping address.
    ///
    /// The address is stored trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is logged in or the address is blank.
    pub fn update_address(&mut self, address: &str) -> Result<(), SessionError> {
        let user = self.user.as_mut().ok_or(SessionError::NotAuthenticated)?;
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(SessionError::BlankAddress);
        }
        user.address = Some(trimmed.to_owned());
        Ok(())
    }
}
