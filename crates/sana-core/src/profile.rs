//! User profile data model
//!
//! The profile record is the system-of-record view of one account: role,
//! doctor verification status, contact attributes, and the favorite-doctor
//! set. Role and verification status are written once at registration and
//! only change through external moderation; the client treats them as
//! read-only.

use crate::identifiers::{DoctorId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Account role, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

/// Moderation state of a doctor account.
///
/// Meaningful only when the role is [`Role::Doctor`]; patient profiles
/// carry [`VerificationStatus::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    None,
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    /// Whether the account is still awaiting moderation.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

// =============================================================================
// FavoriteSet
// =============================================================================

/// Uniqueness-preserving set of favorite doctor ids.
///
/// Insertion order is irrelevant; membership is the only observable fact.
/// Mutated exclusively through the optimistic-toggle path in `sana-app`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(BTreeSet<DoctorId>);

impl FavoriteSet {
    /// Create an empty favorite set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check membership.
    pub fn contains(&self, doctor: &DoctorId) -> bool {
        self.0.contains(doctor)
    }

    /// Add a doctor. Returns `true` if the doctor was not already present.
    pub fn insert(&mut self, doctor: DoctorId) -> bool {
        self.0.insert(doctor)
    }

    /// Remove a doctor. Returns `true` if the doctor was present.
    pub fn remove(&mut self, doctor: &DoctorId) -> bool {
        self.0.remove(doctor)
    }

    /// Flip membership and return the new membership value.
    pub fn toggle(&mut self, doctor: &DoctorId) -> bool {
        if self.0.remove(doctor) {
            false
        } else {
            self.0.insert(doctor.clone());
            true
        }
    }

    /// Force membership to a specific value (used by rollback).
    pub fn set_membership(&mut self, doctor: &DoctorId, member: bool) {
        if member {
            self.0.insert(doctor.clone());
        } else {
            self.0.remove(doctor);
        }
    }

    /// Iterate over favorite doctor ids.
    pub fn iter(&self) -> impl Iterator<Item = &DoctorId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<DoctorId> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = DoctorId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// UserProfile
// =============================================================================

/// One account's profile record.
///
/// The remote store is the system of record; `sana-app` holds an in-memory
/// snapshot refreshed at session resolution and patched optimistically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Document id (equal to the auth provider's user id).
    pub id: UserId,
    pub role: Role,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub favorites: FavoriteSet,
}

impl UserProfile {
    /// Check whether a doctor is in this profile's favorite set.
    pub fn is_favorite(&self, doctor: &DoctorId) -> bool {
        self.favorites.contains(doctor)
    }
}
