//! In-memory document store with scripted failure injection

use async_trait::async_trait;
use sana_core::effects::store::{Direction, Filter, Order, RemoteStore};
use sana_core::errors::StoreError;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use uuid::Uuid;

/// Operation kind, used to target failure injection and to count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Query,
    Insert,
    Update,
}

#[derive(Debug, Default)]
struct StoreState {
    /// collection name → (document id → document)
    collections: HashMap<String, BTreeMap<String, Value>>,
    /// Scripted failures consumed one per matching operation.
    failures: HashMap<StoreOp, VecDeque<StoreError>>,
    /// Calls observed per operation kind, successful or not.
    op_counts: HashMap<StoreOp, usize>,
}

/// Deterministic in-memory [`RemoteStore`] handler.
///
/// Documents live in per-collection maps; `insert` assigns UUID ids and
/// mirrors the assigned id into the document's `id` field, matching the
/// backend convention the typed model relies on.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a document in place directly, bypassing the effect interface.
    pub fn seed(&self, collection: &str, id: &str, mut document: Value) {
        if let Some(object) = document.as_object_mut() {
            object.insert("id".into(), Value::String(id.to_string()));
        }
        let mut state = self.state.lock().unwrap();
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
    }

    /// Read a document for inspection, bypassing the effect interface.
    pub fn document(&self, collection: &str, id: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state.collections.get(collection)?.get(id).cloned()
    }

    /// Script the next call of `op` to fail with `error`.
    ///
    /// Multiple scripted failures for the same operation are consumed in
    /// FIFO order; once the queue is empty the operation succeeds again.
    pub fn fail_next(&self, op: StoreOp, error: StoreError) {
        let mut state = self.state.lock().unwrap();
        state.failures.entry(op).or_default().push_back(error);
    }

    /// Number of calls observed for an operation kind.
    pub fn op_count(&self, op: StoreOp) -> usize {
        let state = self.state.lock().unwrap();
        state.op_counts.get(&op).copied().unwrap_or(0)
    }

    fn begin_op(&self, op: StoreOp) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        *state.op_counts.entry(op).or_insert(0) += 1;
        if let Some(error) = state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(error);
        }
        Ok(())
    }
}

/// Suspend exactly once before completing.
///
/// Every store operation awaits this so that in-memory calls still model
/// network-bound suspension: without it, an operation would finish on its
/// first poll and concurrency behaviour (fetch coalescing, interleaved
/// toggles) would be unobservable in tests.
fn yield_once() -> YieldOnce {
    YieldOnce { yielded: false }
}

struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Order two JSON values for query sorting.
///
/// Strings and numbers order naturally; mixed or non-scalar values keep
/// their relative insertion order. Dates stored as ISO-8601 strings sort
/// correctly under the string branch.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let gate = self.begin_op(StoreOp::Get);
        yield_once().await;
        gate?;
        let state = self.state.lock().unwrap();
        state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        order: Option<&Order>,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, StoreError> {
        let gate = self.begin_op(StoreOp::Query);
        yield_once().await;
        gate?;
        let state = self.state.lock().unwrap();
        let mut results: Vec<Value> = state
            .collections
            .get(collection)
            .map(|docs| docs.values().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = order {
            let null = Value::Null;
            results.sort_by(|a, b| {
                let ordering = compare_values(
                    a.get(&order.field).unwrap_or(&null),
                    b.get(&order.field).unwrap_or(&null),
                );
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    async fn insert(&self, collection: &str, mut record: Value) -> Result<String, StoreError> {
        let gate = self.begin_op(StoreOp::Insert);
        yield_once().await;
        gate?;
        let id = Uuid::new_v4().to_string();
        if let Some(object) = record.as_object_mut() {
            object.insert("id".into(), Value::String(id.clone()));
        }
        let mut state = self.state.lock().unwrap();
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), record);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let gate = self.begin_op(StoreOp::Update);
        yield_once().await;
        gate?;
        let mut state = self.state.lock().unwrap();
        let document = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        match (document.as_object_mut(), patch.as_object()) {
            (Some(target), Some(fields)) => {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
                Ok(())
            }
            _ => Err(StoreError::permission_denied(
                "update requires object documents and patches",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_assigns_and_mirrors_id() {
        let store = MemoryStore::new();
        let id = store
            .insert("appointments", json!({"status": "upcoming"}))
            .await
            .unwrap();

        let doc = store.get("appointments", &id).await.unwrap();
        assert_eq!(doc["id"], json!(id));
        assert_eq!(doc["status"], json!("upcoming"));
    }

    #[tokio::test]
    async fn update_merges_shallowly() {
        let store = MemoryStore::new();
        store.seed("users", "u1", json!({"name": "Ana", "phone": "1"}));
        store
            .update("users", "u1", json!({"phone": "2"}))
            .await
            .unwrap();

        let doc = store.document("users", "u1").unwrap();
        assert_eq!(doc["name"], json!("Ana"));
        assert_eq!(doc["phone"], json!("2"));
    }

    #[tokio::test]
    async fn query_filters_orders_and_limits() {
        let store = MemoryStore::new();
        store.seed("appointments", "a", json!({"p": "u1", "date": "2026-03-01"}));
        store.seed("appointments", "b", json!({"p": "u1", "date": "2026-05-01"}));
        store.seed("appointments", "c", json!({"p": "u2", "date": "2026-04-01"}));

        let results = store
            .query(
                "appointments",
                &Filter::new().field_eq("p", "u1"),
                Some(&Order::desc("date")),
                Some(1),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["date"], json!("2026-05-01"));
    }

    #[tokio::test]
    async fn scripted_failures_are_consumed_in_order() {
        let store = MemoryStore::new();
        store.seed("users", "u1", json!({"name": "Ana"}));
        store.fail_next(StoreOp::Get, StoreError::transient("offline"));

        assert!(store.get("users", "u1").await.unwrap_err().is_transient());
        assert!(store.get("users", "u1").await.is_ok());
        assert_eq!(store.op_count(StoreOp::Get), 2);
    }
}
