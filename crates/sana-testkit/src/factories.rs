//! Test data factories
//!
//! Small constructors for the fixtures most scenarios need, with
//! unremarkable defaults so tests only spell out what they assert on.

use chrono::NaiveDate;
use sana_core::appointment::DoctorRecord;
use sana_core::identifiers::{DoctorId, UserId};
use sana_core::profile::{FavoriteSet, Role, UserProfile, VerificationStatus};

use crate::store::MemoryStore;
use sana_core::effects::store::collections;

/// Build a calendar date; panics on invalid input, which is fine in tests.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A patient profile with no favorites.
pub fn patient_profile(id: &str, name: &str) -> UserProfile {
    UserProfile {
        id: UserId::new(id),
        role: Role::Patient,
        verification_status: VerificationStatus::None,
        display_name: name.to_string(),
        email: Some(format!("{id}@example.test")),
        phone: None,
        favorites: FavoriteSet::new(),
    }
}

/// A doctor profile in the given moderation state.
pub fn doctor_profile(id: &str, name: &str, status: VerificationStatus) -> UserProfile {
    UserProfile {
        role: Role::Doctor,
        verification_status: status,
        ..patient_profile(id, name)
    }
}

/// A doctor directory entry.
pub fn doctor(id: &str, name: &str, speciality: &str) -> DoctorRecord {
    DoctorRecord {
        id: DoctorId::new(id),
        name: name.to_string(),
        image_url: Some(format!("https://cdn.example.test/{id}.png")),
        speciality: speciality.to_string(),
        location: "Clinic A".to_string(),
        available: true,
    }
}

/// Seed a profile document under the user's id.
pub fn seed_profile(store: &MemoryStore, profile: &UserProfile) {
    store.seed(
        collections::USERS,
        profile.id.as_str(),
        serde_json::to_value(profile).unwrap(),
    );
}

/// Seed a doctor directory document under the doctor's id.
pub fn seed_doctor(store: &MemoryStore, doctor: &DoctorRecord) {
    store.seed(
        collections::DOCTORS,
        doctor.id.as_str(),
        serde_json::to_value(doctor).unwrap(),
    );
}
