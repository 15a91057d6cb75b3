//! # View State Module
//!
//! View state types consumed directly by frontends. These types are
//! plain data: serializable for debugging, cheap to clone, and free of
//! any effect handles.
//!
//! Selection, scrolling, and other presentation concerns belong to the
//! frontend's own state, not here.

pub mod appointments;

pub use appointments::AppointmentsState;
