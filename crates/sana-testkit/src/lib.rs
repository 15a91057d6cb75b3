//! # Sana Testkit
//!
//! Deterministic in-memory implementations of the `sana-core` effect
//! traits, plus factories for common test fixtures.
//!
//! # Blocking Lock Usage
//!
//! Uses `std::sync::Mutex` because this is test infrastructure: tests run
//! in controlled contexts, lock contention is not a concern, and the
//! simpler synchronous API keeps scenarios readable.

#![allow(clippy::unwrap_used)]

pub mod factories;
pub mod local;
pub mod store;

pub use factories::{date, doctor, doctor_profile, patient_profile, seed_doctor, seed_profile};
pub use local::MemoryPersistence;
pub use store::{MemoryStore, StoreOp};
