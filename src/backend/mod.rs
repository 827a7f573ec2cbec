/// Persistent key-value backends shared between extension contexts
///
/// A backend is the only channel between the content script, the favorites
/// page and the popup. Each of them holds its own cells; they agree on values
/// by reading, writing and watching the same keys here.

mod chrome;
mod memory;

pub use chrome::ChromeStorage;
pub use memory::MemoryBackend;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;

/// Invoked with the new value whenever a key changes in any context.
/// `None` means the key was removed.
pub type WatchCallback = Rc<dyn Fn(Option<Value>)>;

#[async_trait(?Send)]
pub trait StorageBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Register `callback` for changes to `key`. The registration lives until
    /// the returned handle is released or dropped.
    fn watch(&self, key: &str, callback: WatchCallback) -> Unwatch;
}

/// Handle for one watch registration.
pub struct Unwatch {
    release: Option<Box<dyn FnOnce()>>,
}

impl Unwatch {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Unwatch {
            release: Some(Box::new(release)),
        }
    }

    pub fn unwatch(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Unwatch {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Unwatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unwatch")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Absent and explicitly empty (`null`) values carry no data.
pub fn is_present(value: &Value) -> bool {
    !value.is_null()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_unwatch_releases_once() {
        let count = Rc::new(Cell::new(0));
        let handle = {
            let count = count.clone();
            Unwatch::new(move || count.set(count.get() + 1))
        };

        handle.unwatch();

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unwatch_releases_on_drop() {
        let count = Rc::new(Cell::new(0));
        {
            let count = count.clone();
            let _handle = Unwatch::new(move || count.set(count.get() + 1));
        }

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_is_present() {
        assert!(!is_present(&Value::Null));
        assert!(is_present(&serde_json::json!({})));
        assert!(is_present(&serde_json::json!(false)));
    }
}
