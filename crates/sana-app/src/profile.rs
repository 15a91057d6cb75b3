//! Cached, single-flight profile store
//!
//! Owns the in-memory copy of the current session's profile. The remote
//! store is the system of record; everything here is a snapshot. Readers
//! always receive `Arc<UserProfile>` clones, never a mutable reference, so
//! an optimistic patch can never tear a concurrent render.
//!
//! Fetching and caching are separate steps: [`ProfileStore::fetch`] only
//! reads, and the caller installs the result once it has decided the
//! result is still current. The session machine relies on this to keep
//! stale fetches from resurrecting a signed-out profile.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use sana_core::effects::store::{collections, RemoteStore};
use sana_core::errors::StoreError;
use sana_core::identifiers::UserId;
use sana_core::profile::UserProfile;
use std::collections::HashMap;
use std::sync::Arc;

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<UserProfile>, StoreError>>>;

/// Cached view of the current user's profile record.
///
/// Fetches are single-flight per user id: a fetch already in progress for
/// the same id is shared between callers rather than duplicated against
/// the remote store.
pub struct ProfileStore<S> {
    store: Arc<S>,
    cached: Mutex<Option<Arc<UserProfile>>>,
    in_flight: Arc<Mutex<HashMap<UserId, SharedFetch>>>,
}

impl<S: RemoteStore + 'static> ProfileStore<S> {
    /// Create a store backed by the given remote handler.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cached: Mutex::new(None),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fetch the profile for `user`, coalescing with any in-flight fetch
    /// for the same id.
    ///
    /// The cached snapshot is untouched; call [`install`](Self::install)
    /// with the result once it is known to still be current.
    pub async fn fetch(&self, user: &UserId) -> Result<Arc<UserProfile>, StoreError> {
        let fetch = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.get(user) {
                Some(existing) => existing.clone(),
                None => {
                    let map = Arc::clone(&self.in_flight);
                    let store = Arc::clone(&self.store);
                    let id = user.clone();
                    // The future retires its own map entry before any
                    // awaiter can observe the result, so a later fetch
                    // for the same id always starts a fresh remote read
                    // instead of replaying a memoized one.
                    let fetch = async move {
                        let result = Self::remote_fetch(store, id.clone()).await;
                        map.lock().remove(&id);
                        result
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(user.clone(), fetch.clone());
                    fetch
                }
            }
        };

        fetch.await
    }

    /// Install a fetched snapshot as the cached profile.
    pub fn install(&self, profile: Arc<UserProfile>) {
        *self.cached.lock() = Some(profile);
    }

    async fn remote_fetch(store: Arc<S>, user: UserId) -> Result<Arc<UserProfile>, StoreError> {
        let document = store.get(collections::USERS, user.as_str()).await?;
        serde_json::from_value::<UserProfile>(document)
            .map(Arc::new)
            .map_err(|error| {
                tracing::warn!(%error, user = %user, "undecodable profile document");
                StoreError::transient(format!("undecodable profile document: {error}"))
            })
    }

    /// The cached snapshot, if any.
    pub fn cached(&self) -> Option<Arc<UserProfile>> {
        self.cached.lock().clone()
    }

    /// Mutate the cached profile in memory only.
    ///
    /// Never touches the remote store; this exists purely so the UI can
    /// render an optimistic result immediately. Returns the new snapshot,
    /// or `None` when no profile is cached.
    pub fn apply_local_patch(
        &self,
        mutate: impl FnOnce(&mut UserProfile),
    ) -> Option<Arc<UserProfile>> {
        let mut cached = self.cached.lock();
        let current = cached.as_ref()?;
        let mut updated = UserProfile::clone(current);
        mutate(&mut updated);
        let snapshot = Arc::new(updated);
        *cached = Some(Arc::clone(&snapshot));
        Some(snapshot)
    }

    /// Drop the cached snapshot (sign-out path).
    pub fn clear(&self) {
        *self.cached.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sana_core::identifiers::DoctorId;
    use sana_testkit::store::StoreOp;
    use sana_testkit::{patient_profile, seed_profile, MemoryStore};

    fn store_with(profile: &UserProfile) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        seed_profile(&store, profile);
        store
    }

    #[tokio::test]
    async fn fetch_leaves_caching_to_the_caller() {
        let profile = patient_profile("u1", "Ana");
        let profiles = ProfileStore::new(store_with(&profile));

        let fetched = profiles.fetch(&UserId::new("u1")).await.unwrap();
        assert_eq!(*fetched, profile);
        // Nothing cached until the caller decides the result is current.
        assert!(profiles.cached().is_none());

        profiles.install(fetched);
        assert_eq!(profiles.cached().as_deref(), Some(&profile));
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_remote_read() {
        let profile = patient_profile("u1", "Ana");
        let store = store_with(&profile);
        let profiles = ProfileStore::new(Arc::clone(&store));
        let user = UserId::new("u1");

        let (a, b) = tokio::join!(profiles.fetch(&user), profiles.fetch(&user));
        assert_eq!(*a.unwrap(), profile);
        assert_eq!(*b.unwrap(), profile);
        assert_eq!(store.op_count(StoreOp::Get), 1);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_cache_untouched() {
        let profile = patient_profile("u1", "Ana");
        let store = store_with(&profile);
        let profiles = ProfileStore::new(Arc::clone(&store));
        let user = UserId::new("u1");

        let fetched = profiles.fetch(&user).await.unwrap();
        profiles.install(fetched);
        store.fail_next(StoreOp::Get, StoreError::transient("offline"));
        assert!(profiles.fetch(&user).await.is_err());
        assert_eq!(profiles.cached().as_deref(), Some(&profile));
    }

    #[tokio::test]
    async fn failed_fetch_is_not_replayed_to_later_callers() {
        let profile = patient_profile("u1", "Ana");
        let store = store_with(&profile);
        let profiles = ProfileStore::new(Arc::clone(&store));
        let user = UserId::new("u1");

        store.fail_next(StoreOp::Get, StoreError::transient("offline"));
        let (a, b) = tokio::join!(profiles.fetch(&user), profiles.fetch(&user));
        // Coalesced callers share the one failed read.
        assert!(a.is_err());
        assert!(b.is_err());
        assert_eq!(store.op_count(StoreOp::Get), 1);

        // A retry reaches the store instead of replaying the memoized
        // failure.
        let retried = profiles.fetch(&user).await.unwrap();
        assert_eq!(*retried, profile);
        assert_eq!(store.op_count(StoreOp::Get), 2);
    }

    #[tokio::test]
    async fn local_patch_never_writes_remotely() {
        let profile = patient_profile("u1", "Ana");
        let store = store_with(&profile);
        let profiles = ProfileStore::new(Arc::clone(&store));
        profiles.install(Arc::new(profile.clone()));

        let snapshot = profiles
            .apply_local_patch(|p| {
                p.favorites.insert(DoctorId::new("d1"));
            })
            .unwrap();

        assert!(snapshot.is_favorite(&DoctorId::new("d1")));
        assert_eq!(store.op_count(StoreOp::Update), 0);
        // Remote document still has no favorites.
        let remote = store.document("users", "u1").unwrap();
        assert_eq!(remote["favorites"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn local_patch_without_cache_is_a_no_op() {
        let profiles = ProfileStore::new(Arc::new(MemoryStore::new()));
        assert!(profiles.apply_local_patch(|_| {}).is_none());
    }
}
