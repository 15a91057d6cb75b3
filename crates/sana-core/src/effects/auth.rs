//! Authentication provider boundary
//!
//! The auth provider is an external SDK that emits a strictly ordered
//! stream of sign-in/sign-out events. No other contract is assumed: in
//! particular, a `SignedIn` may arrive for a user whose profile document
//! does not exist yet, and a `SignedOut` may arrive while a profile fetch
//! triggered by an earlier `SignedIn` is still in flight.

use crate::identifiers::UserId;

/// One event from the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A user completed sign-in; `user` is the provider-assigned id.
    SignedIn { user: UserId },
    /// The current user signed out (or the token was invalidated).
    SignedOut,
}

impl AuthEvent {
    /// Convenience constructor for sign-in events.
    pub fn signed_in(user: impl Into<UserId>) -> Self {
        Self::SignedIn { user: user.into() }
    }
}
