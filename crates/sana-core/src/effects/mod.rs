//! Effect trait definitions
//!
//! Pure trait definitions for every side-effect boundary the client core
//! touches. This module defines **what** can be performed; handlers define
//! **how**:
//!
//! - Production backends (managed document store, auth SDK, device
//!   key-value storage) implement these outside this repository.
//! - `sana-testkit` provides deterministic in-memory handlers for tests.
//!
//! All effect-using code in `sana-app` is parameterized by these traits,
//! which is what makes the staleness and rollback semantics testable.

pub mod auth;
pub mod local;
pub mod store;
