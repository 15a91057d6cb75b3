//! Device-local key-value persistence
//!
//! Used only to remember the signed-in user id and a last-known profile
//! snapshot so a cold start can render something before the first auth
//! event arrives. Never a source of truth: every value here is replaced
//! or cleared by the next session resolution.

/// Keys written by the session layer.
pub mod keys {
    /// Raw user id of the last signed-in account.
    pub const SESSION_USER: &str = "session.user";
    /// JSON-serialized [`UserProfile`](crate::profile::UserProfile) snapshot.
    pub const PROFILE_SNAPSHOT: &str = "session.profile";
}

/// Synchronous string key-value storage on the device.
///
/// Implementations are expected to be cheap enough to call on the UI
/// path (in-memory cache over whatever the platform offers).
pub trait LocalPersistence: Send + Sync {
    /// Read a value, if present.
    fn load(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn store(&self, key: &str, value: &str);

    /// Delete a value; absent keys are a no-op.
    fn remove(&self, key: &str);
}
