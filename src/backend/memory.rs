/// In-memory backend for tests and for running cells outside the browser

use super::{StorageBackend, Unwatch, WatchCallback};
use crate::error::{Result, StorageError};
use async_trait::async_trait;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Shared in-memory namespace. Clones share the same storage, so handing a
/// clone to each simulated context gives them one common backend, the way
/// browser storage is shared between a content script and an extension page.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    values: HashMap<String, Value>,
    watchers: HashMap<String, Vec<(u64, WatchCallback)>>,
    next_watch_id: u64,
    set_calls: HashMap<String, usize>,
    fail_gets: bool,
    fail_sets: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value without notifying watchers.
    pub fn seed(&self, key: &str, value: Value) {
        self.state.borrow_mut().values.insert(key.to_string(), value);
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.state.borrow().values.get(key).cloned()
    }

    /// Delete a key and tell its watchers.
    pub fn remove(&self, key: &str) {
        let removed = self.state.borrow_mut().values.remove(key).is_some();
        if removed {
            self.dispatch(key, None);
        }
    }

    /// Deliver a notification without touching stored data. Models duplicated
    /// or reordered delivery from another context.
    pub fn notify(&self, key: &str, value: Option<Value>) {
        self.dispatch(key, value);
    }

    pub fn fail_gets(&self, fail: bool) {
        self.state.borrow_mut().fail_gets = fail;
    }

    pub fn fail_sets(&self, fail: bool) {
        self.state.borrow_mut().fail_sets = fail;
    }

    /// Number of `set` calls issued for `key`, failed ones included.
    pub fn set_calls(&self, key: &str) -> usize {
        self.state.borrow().set_calls.get(key).copied().unwrap_or(0)
    }

    pub fn watcher_count(&self, key: &str) -> usize {
        self.state
            .borrow()
            .watchers
            .get(key)
            .map_or(0, |watchers| watchers.len())
    }

    fn dispatch(&self, key: &str, value: Option<Value>) {
        // Callbacks may write back into this backend, so no borrow is held
        // while they run.
        let callbacks: Vec<WatchCallback> = self
            .state
            .borrow()
            .watchers
            .get(key)
            .map(|watchers| watchers.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default();

        for callback in callbacks {
            callback(value.clone());
        }
    }
}

#[async_trait(?Send)]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let state = self.state.borrow();
        if state.fail_gets {
            return Err(StorageError::Backend(format!("get '{}' rejected", key)));
        }
        Ok(state.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let changed = {
            let mut state = self.state.borrow_mut();
            *state.set_calls.entry(key.to_string()).or_insert(0) += 1;

            if state.fail_sets {
                return Err(StorageError::Backend(format!("set '{}' rejected", key)));
            }

            let previous = state.values.insert(key.to_string(), value.clone());
            previous.as_ref() != Some(&value)
        };

        if changed {
            self.dispatch(key, Some(value));
        }
        Ok(())
    }

    fn watch(&self, key: &str, callback: WatchCallback) -> Unwatch {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_watch_id;
            state.next_watch_id += 1;
            state
                .watchers
                .entry(key.to_string())
                .or_default()
                .push((id, callback));
            id
        };

        let weak: Weak<RefCell<MemoryState>> = Rc::downgrade(&self.state);
        let key = key.to_string();
        Unwatch::new(move || {
            if let Some(state) = weak.upgrade() {
                let mut state = state.borrow_mut();
                if let Some(watchers) = state.watchers.get_mut(&key) {
                    watchers.retain(|(watch_id, _)| *watch_id != id);
                    if watchers.is_empty() {
                        state.watchers.remove(&key);
                    }
                }
            }
        })
    }
}
