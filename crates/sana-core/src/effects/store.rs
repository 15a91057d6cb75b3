//! Remote document store boundary
//!
//! The backing store is an opaque document database exposing CRUD
//! primitives over named collections. Documents cross this boundary as
//! `serde_json::Value`; the typed model in this crate (de)serializes to
//! and from them at the call sites in `sana-app`.
//!
//! Failures are reported through [`StoreError`](crate::errors::StoreError);
//! the store gives no ordering or transactional guarantees beyond
//! per-document atomicity of `insert` and `update`.

use crate::errors::StoreError;
use async_trait::async_trait;
use serde_json::Value;

/// Collection names used by the client.
pub mod collections {
    /// One profile document per account, keyed by the auth user id.
    pub const USERS: &str = "users";
    /// The doctor directory.
    pub const DOCTORS: &str = "doctors";
    /// Appointment records; never deleted, only status-transitioned.
    pub const APPOINTMENTS: &str = "appointments";
}

// =============================================================================
// Query building blocks
// =============================================================================

/// Conjunction of field-equality clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// Create an empty filter (matches every document).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `field == value` clause.
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    /// The clauses in insertion order.
    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    /// Evaluate the filter against a document.
    ///
    /// A clause naming a field the document lacks does not match.
    pub fn matches(&self, document: &Value) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| document.get(field) == Some(value))
    }
}

/// Sort direction for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Single-field ordering for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    /// Order ascending by a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    /// Order descending by a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }
}

// =============================================================================
// RemoteStore
// =============================================================================

/// CRUD + query primitives of the remote document store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read a single document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Value, StoreError>;

    /// Read all documents matching `filter`, optionally ordered and limited.
    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        order: Option<&Order>,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert a new document; the store assigns and returns its id.
    async fn insert(&self, collection: &str, record: Value) -> Result<String, StoreError>;

    /// Shallow-merge `patch` into an existing document's top-level fields.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;
}
