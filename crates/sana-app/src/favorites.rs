//! Optimistic favorite-doctor toggles
//!
//! Local-first mutation with rollback: membership flips in the cached
//! profile immediately (zero-latency UI), the remote write follows, and a
//! remote failure restores membership to exactly its pre-toggle value.
//!
//! Toggles for the same user are serialized through a per-user async
//! mutex: a rapid double-tap queues the second toggle behind the first
//! instead of letting the two writes race and diverge from remote truth.
//! The gate is per user rather than per doctor because each write sends
//! the whole favorite set; concurrent writes for different doctors would
//! otherwise be able to clobber each other remotely.

use async_lock::Mutex as AsyncMutex;
use parking_lot::Mutex;
use sana_core::effects::store::{collections, RemoteStore};
use sana_core::errors::StoreError;
use sana_core::identifiers::{DoctorId, UserId};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::profile::ProfileStore;

/// What a resolved toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
}

/// Failure of a favorite toggle. The optimistic flip has been rolled
/// back by the time the caller sees either variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToggleError {
    /// No cached profile for this user — nothing to toggle against.
    #[error("no profile loaded for the current session")]
    NoProfile,

    #[error("favorite toggle rejected by the store: {0}")]
    Remote(StoreError),
}

/// Optimistic mutation handler for the favorite set.
pub struct FavoriteToggles<S> {
    store: Arc<S>,
    profiles: Arc<ProfileStore<S>>,
    /// One gate per user id; entries are retained for reuse. One user per
    /// device session in practice, so the map stays tiny.
    gates: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl<S: RemoteStore + 'static> FavoriteToggles<S> {
    pub fn new(store: Arc<S>, profiles: Arc<ProfileStore<S>>) -> Self {
        Self {
            store,
            profiles,
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Toggle `doctor` in `user`'s favorite set.
    ///
    /// The cached profile reflects the new membership before the remote
    /// write is issued; on failure the previous membership is restored
    /// exactly and the error is surfaced as non-fatal.
    pub async fn toggle(
        &self,
        user: &UserId,
        doctor: &DoctorId,
    ) -> Result<FavoriteToggle, ToggleError> {
        let gate = {
            let mut gates = self.gates.lock();
            Arc::clone(gates.entry(user.clone()).or_default())
        };
        let _serialized = gate.lock().await;

        let cached = self.profiles.cached().ok_or(ToggleError::NoProfile)?;
        if cached.id != *user {
            // The session changed under us; the cached profile belongs to
            // someone else now.
            return Err(ToggleError::NoProfile);
        }
        let was_favorite = cached.is_favorite(doctor);

        let patched = self
            .profiles
            .apply_local_patch(|profile| {
                profile.favorites.toggle(doctor);
            })
            .ok_or(ToggleError::NoProfile)?;

        let write = self
            .store
            .update(
                collections::USERS,
                user.as_str(),
                json!({ "favorites": &patched.favorites }),
            )
            .await;

        match write {
            Ok(()) => Ok(if was_favorite {
                FavoriteToggle::Removed
            } else {
                FavoriteToggle::Added
            }),
            Err(error) => {
                self.profiles.apply_local_patch(|profile| {
                    profile.favorites.set_membership(doctor, was_favorite);
                });
                tracing::warn!(
                    %error,
                    doctor = %doctor,
                    "favorite toggle failed; optimistic change reverted"
                );
                Err(ToggleError::Remote(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use sana_testkit::store::StoreOp;
    use sana_testkit::{patient_profile, seed_profile, MemoryStore};

    async fn toggles_for(
        profile: &sana_core::profile::UserProfile,
    ) -> (Arc<MemoryStore>, FavoriteToggles<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        seed_profile(&store, profile);
        let profiles = Arc::new(ProfileStore::new(Arc::clone(&store)));
        let fetched = profiles.fetch(&profile.id).await.unwrap();
        profiles.install(fetched);
        let toggles = FavoriteToggles::new(Arc::clone(&store), profiles);
        (store, toggles)
    }

    fn favorites_of(toggles: &FavoriteToggles<MemoryStore>) -> sana_core::profile::FavoriteSet {
        toggles.profiles.cached().unwrap().favorites.clone()
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let profile = patient_profile("u1", "Ana");
        let (store, toggles) = toggles_for(&profile).await;
        let user = UserId::new("u1");
        let doctor = DoctorId::new("d1");

        assert_eq!(
            toggles.toggle(&user, &doctor).await.unwrap(),
            FavoriteToggle::Added
        );
        assert!(favorites_of(&toggles).contains(&doctor));
        let remote = store.document("users", "u1").unwrap();
        assert_eq!(remote["favorites"], serde_json::json!(["d1"]));

        assert_eq!(
            toggles.toggle(&user, &doctor).await.unwrap(),
            FavoriteToggle::Removed
        );
        assert_eq!(favorites_of(&toggles), profile.favorites);
    }

    #[tokio::test]
    async fn failed_toggle_rolls_back_exactly() {
        let profile = patient_profile("u1", "Ana");
        let (store, toggles) = toggles_for(&profile).await;
        let user = UserId::new("u1");
        let doctor = DoctorId::new("d1");
        let before = favorites_of(&toggles);

        store.fail_next(StoreOp::Update, StoreError::transient("offline"));
        assert_matches!(
            toggles.toggle(&user, &doctor).await,
            Err(ToggleError::Remote(_))
        );

        // Post-call favorite set equals the pre-call set exactly, and the
        // remote document was never changed.
        assert_eq!(favorites_of(&toggles), before);
        let remote = store.document("users", "u1").unwrap();
        assert_eq!(remote["favorites"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn concurrent_toggles_on_one_doctor_are_sequenced() {
        let profile = patient_profile("u1", "Ana");
        let (store, toggles) = toggles_for(&profile).await;
        let user = UserId::new("u1");
        let doctor = DoctorId::new("d1");

        // Rapid double-tap: both resolve, in order, and the set returns
        // to its original value instead of diverging.
        let (first, second) =
            tokio::join!(toggles.toggle(&user, &doctor), toggles.toggle(&user, &doctor));
        assert_eq!(first.unwrap(), FavoriteToggle::Added);
        assert_eq!(second.unwrap(), FavoriteToggle::Removed);

        assert_eq!(favorites_of(&toggles), profile.favorites);
        assert_eq!(store.op_count(StoreOp::Update), 2);
        let remote = store.document("users", "u1").unwrap();
        assert_eq!(remote["favorites"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn concurrent_toggles_on_different_doctors_both_persist() {
        let profile = patient_profile("u1", "Ana");
        let (store, toggles) = toggles_for(&profile).await;
        let user = UserId::new("u1");
        let d1 = DoctorId::new("d1");
        let d2 = DoctorId::new("d2");

        // Each write carries the whole favorite set, so the second toggle
        // must see the first one's result rather than overwrite it.
        let (first, second) = tokio::join!(toggles.toggle(&user, &d1), toggles.toggle(&user, &d2));
        assert_eq!(first.unwrap(), FavoriteToggle::Added);
        assert_eq!(second.unwrap(), FavoriteToggle::Added);

        assert_eq!(store.op_count(StoreOp::Update), 2);
        let remote = store.document("users", "u1").unwrap();
        assert_eq!(remote["favorites"], serde_json::json!(["d1", "d2"]));
    }

    #[tokio::test]
    async fn toggle_without_a_session_profile_fails() {
        let store = Arc::new(MemoryStore::new());
        let profiles = Arc::new(ProfileStore::new(Arc::clone(&store)));
        let toggles = FavoriteToggles::new(store, profiles);

        assert_matches!(
            toggles
                .toggle(&UserId::new("u1"), &DoctorId::new("d1"))
                .await,
            Err(ToggleError::NoProfile)
        );
    }

    #[tokio::test]
    async fn toggle_for_a_different_user_is_rejected() {
        let profile = patient_profile("u1", "Ana");
        let (_store, toggles) = toggles_for(&profile).await;

        assert_matches!(
            toggles
                .toggle(&UserId::new("someone-else"), &DoctorId::new("d1"))
                .await,
            Err(ToggleError::NoProfile)
        );
    }
}
