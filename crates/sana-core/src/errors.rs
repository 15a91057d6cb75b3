//! Error taxonomy for remote-store operations
//!
//! The core never retries automatically; every remote call surfaces one of
//! these variants to its caller, which decides whether to retry, show an
//! inline message, or roll back. Stale session fetches are not errors at
//! all — they are dropped silently by the generation check in `sana-app`.

use thiserror::Error;

/// Failure of a remote-store operation.
///
/// `Clone` because fetch results are shared between coalesced callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Network-level failure; retryable by the caller.
    #[error("transient store failure: {reason}")]
    Transient { reason: String },

    /// The addressed document does not exist. Terminal.
    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// The store rejected the operation. Terminal.
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },
}

impl StoreError {
    /// Create a transient error.
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
        }
    }

    /// Create a not-found error for a document address.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a permission-denied error.
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}
