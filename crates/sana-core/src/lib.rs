//! # Sana Core
//!
//! Pure domain layer for the Sana appointment-booking client: identifier
//! newtypes, the profile and appointment data model, the error taxonomy,
//! and the effect trait definitions consumed by `sana-app`.
//!
//! This crate defines **what** effects can be performed; handlers define
//! **how**. Production backends and the in-memory handlers in
//! `sana-testkit` both implement the traits in [`effects`].

pub mod appointment;
pub mod effects;
pub mod errors;
pub mod identifiers;
pub mod profile;

pub use appointment::{Appointment, AppointmentStatus, DoctorRecord};
pub use effects::auth::AuthEvent;
pub use effects::local::LocalPersistence;
pub use effects::store::{collections, Direction, Filter, Order, RemoteStore};
pub use errors::StoreError;
pub use identifiers::{AppointmentId, DoctorId, UserId};
pub use profile::{FavoriteSet, Role, UserProfile, VerificationStatus};
