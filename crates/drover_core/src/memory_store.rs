use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use serde_json::Value;

use crate::store::{ChangeListener, RealtimeStore, StoreError, Subscription};

/// In-memory [`RealtimeStore`] for tests.
///
/// Listeners run synchronously under the store lock, so they must not call
/// back into the store.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    values: HashMap<String, Value>,
    listeners: HashMap<String, Vec<(u64, ChangeListener)>>,
    next_listener_id: u64,
}

impl Inner {
    fn notify(&mut self, path: &str) {
        let Some(value) = self.values.get(path).cloned() else {
            return;
        };
        if let Some(listeners) = self.listeners.get_mut(path) {
            for (_, listener) in listeners.iter_mut() {
                listener(&value);
            }
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Seeds a value without going through the async interface.
    pub fn seed(&self, path: &str, value: Value) {
        let mut inner = self.inner.lock().unwrap();
        inner.values.insert(path.to_owned(), value);
    }

    pub fn snapshot(&self, path: &str) -> Option<Value> {
        self.inner.lock().unwrap().values.get(path).cloned()
    }
}

impl RealtimeStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.snapshot(path))
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.values.insert(path.to_owned(), value);
        inner.notify(path);
        Ok(())
    }

    async fn update(&self, path: &str, partial: Value) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let merged = match (inner.values.get(path), partial) {
            (Some(Value::Object(existing)), Value::Object(updates)) => {
                let mut merged = existing.clone();
                for (key, value) in updates {
                    merged.insert(key, value);
                }
                Value::Object(merged)
            }
            (_, replacement) => replacement,
        };
        inner.values.insert(path.to_owned(), merged);
        inner.notify(path);
        Ok(())
    }

    fn subscribe(&self, path: &str, on_change: ChangeListener) -> Subscription {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner
            .listeners
            .entry(path.to_owned())
            .or_default()
            .push((id, on_change));

        let store = Arc::clone(&self.inner);
        let path = path.to_owned();
        Subscription::new(move || {
            let mut inner = store.lock().unwrap();
            if let Some(listeners) = inner.listeners.get_mut(&path) {
                listeners.retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }
}
