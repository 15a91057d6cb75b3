//! # Sana App
//!
//! Portable headless application core for the Sana appointment-booking
//! client. Frontends (mobile, web admin) render the state this crate
//! publishes and call its command functions; everything UI-shaped lives
//! outside this crate.
//!
//! ## Architecture
//!
//! ```text
//! AuthProvider events ─▶ SessionStateMachine ─▶ SessionState (watch)
//!                              │
//!                              ▼
//!                         ProfileStore ◀── FavoriteToggles (optimistic)
//!                              │
//!                        RemoteStore ◀── AppointmentLifecycle
//! ```
//!
//! The three invariants the whole crate is built around:
//!
//! - **Staleness**: every auth event bumps a generation counter; a profile
//!   fetch completion is applied only if its generation is still current.
//! - **Terminal statuses**: appointments only ever move
//!   `upcoming → cancelled` or `upcoming → completed`; records are never
//!   deleted.
//! - **Optimistic exactness**: a failed favorite toggle restores the
//!   pre-toggle membership exactly, never a blind re-flip.

pub mod appointments;
pub mod core;
pub mod favorites;
pub mod profile;
pub mod session;
pub mod views;

pub use crate::appointments::{AppointmentLifecycle, BookingError, CancelAck, CancelError};
pub use crate::core::AppCore;
pub use crate::favorites::{FavoriteToggle, FavoriteToggles, ToggleError};
pub use crate::profile::ProfileStore;
pub use crate::session::{ProfileFetch, SessionState, SessionStateMachine};
pub use crate::views::AppointmentsState;
