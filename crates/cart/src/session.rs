//! Authentication session state.
//!
//! Identity is an explicit value passed into the cart subsystem, not an
//! ambient global. The embedding page layer creates an [`AuthSession`] at
//! startup and replaces it on login/logout; the cart subsystem only observes
//! the resulting [`AuthEvent`] transitions, which makes merge triggering a
//! pure function of an observed state change.

use serde::{Deserialize, Serialize};

use clementine_core::UserId;

/// Identity mode for the current client instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AuthSession {
    /// No user logged in; the local cart is authoritative.
    #[default]
    Anonymous,
    /// A user is logged in; the remote cart is authoritative.
    Authenticated {
        /// The logged-in user.
        user_id: UserId,
    },
}

impl AuthSession {
    /// Session for a logged-in user.
    #[must_use]
    pub const fn authenticated(user_id: UserId) -> Self {
        Self::Authenticated { user_id }
    }

    /// Whether a user is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// The logged-in user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user_id } => Some(user_id),
        }
    }

    /// The session that results from applying an auth event.
    #[must_use]
    pub fn apply(&self, event: &AuthEvent) -> Self {
        match event {
            AuthEvent::LoggedIn { user_id } => Self::authenticated(user_id.clone()),
            AuthEvent::LoggedOut => Self::Anonymous,
        }
    }
}

/// A successful identity transition observed by the page layer.
///
/// Only the *event* matters to the cart subsystem; how credentials were
/// verified is out of scope. Signup that ends in a session counts as
/// `LoggedIn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Login or signup succeeded.
    LoggedIn {
        /// The now-authenticated user.
        user_id: UserId,
    },
    /// The user logged out.
    LoggedOut,
}
