//! In-memory device persistence

use sana_core::effects::local::LocalPersistence;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory [`LocalPersistence`] handler.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryPersistence {
    /// Create an empty persistence handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored keys, for inspection.
    pub fn keys(&self) -> Vec<String> {
        self.values.lock().unwrap().keys().cloned().collect()
    }
}

impl LocalPersistence for MemoryPersistence {
    fn load(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}
