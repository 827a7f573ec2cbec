/// Synchronized state cells
///
/// A `SyncedCell` mirrors one backend key as a typed in-memory value. Every
/// context that builds a cell for the same key ends up with the same value:
/// local writes are persisted to the backend, and the backend's change
/// notifications bring writes from other contexts back in.
///
/// Lifecycle:
/// 1. On construction the cell holds the default value and is not loaded.
///    It registers a watch for its key and spawns the initial read.
/// 2. The cell becomes loaded when the initial read succeeds or when the
///    first notification carrying a value arrives, whichever is first.
/// 3. Writes always apply in memory. They reach the backend only once the
///    cell is loaded, so a fresh default never clobbers stored data.
/// 4. After `teardown` the cell no longer changes: late reads, late
///    notifications and new writes are ignored.
///
/// Cross-context ordering is last-notification-wins. A notification carrying
/// an older value than the one already applied still overwrites it.
///
/// While a cell is persisting a burst of its own writes, notifications equal
/// to any value written in that burst are treated as echoes and skipped, so
/// the local value never steps back to an earlier write of the same burst.
/// Applying a notification from another context ends that skipping, so the
/// echo of whichever write the backend kept last still brings every context
/// to the same value.

use crate::backend::{StorageBackend, Unwatch, WatchCallback, is_present};
use crate::error::{Result, StorageError};
use crate::runtime::Spawner;
use futures_util::FutureExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

type ObserverFn<T> = Rc<dyn Fn(&T)>;

pub struct SyncedCell<T> {
    inner: Rc<CellInner<T>>,
}

struct CellInner<T> {
    key: String,
    backend: Rc<dyn StorageBackend>,
    spawner: Rc<dyn Spawner>,
    state: RefCell<CellState<T>>,
    observers: RefCell<Vec<(u64, ObserverFn<T>)>>,
    next_observer_id: Cell<u64>,
    watch: RefCell<Option<Unwatch>>,
    outbox: RefCell<VecDeque<Value>>,
    /// Values queued or persisted since the current flush started.
    own_writes: RefCell<Vec<Value>>,
    flushing: Cell<bool>,
}

struct CellState<T> {
    value: T,
    loaded: bool,
    notified: bool,
    torn_down: bool,
}

impl<T> SyncedCell<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + 'static,
{
    pub fn new(
        backend: Rc<dyn StorageBackend>,
        spawner: Rc<dyn Spawner>,
        key: impl Into<String>,
        default: T,
    ) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(StorageError::InvalidKey);
        }

        let inner = Rc::new(CellInner {
            key,
            backend,
            spawner,
            state: RefCell::new(CellState {
                value: default,
                loaded: false,
                notified: false,
                torn_down: false,
            }),
            observers: RefCell::new(Vec::new()),
            next_observer_id: Cell::new(0),
            watch: RefCell::new(None),
            outbox: RefCell::new(VecDeque::new()),
            own_writes: RefCell::new(Vec::new()),
            flushing: Cell::new(false),
        });

        let callback: WatchCallback = {
            let weak = Rc::downgrade(&inner);
            Rc::new(move |value| {
                if let Some(inner) = weak.upgrade() {
                    inner.apply_notification(value);
                }
            })
        };
        let watch = inner.backend.watch(&inner.key, callback);
        *inner.watch.borrow_mut() = Some(watch);

        let weak = Rc::downgrade(&inner);
        let backend = inner.backend.clone();
        let key = inner.key.clone();
        inner.spawner.spawn(
            async move {
                let result = backend.get(&key).await;
                match weak.upgrade() {
                    Some(inner) => inner.apply_load(result),
                    None => log::debug!("Cell for '{}' dropped before load finished", key),
                }
            }
            .boxed_local(),
        );

        log::debug!("Created synced cell for '{}'", inner.key);
        Ok(SyncedCell { inner })
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Current in-memory value. Never waits on the backend.
    pub fn get(&self) -> T {
        self.inner.state.borrow().value.clone()
    }

    /// Borrowing read for values that are expensive to clone.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.state.borrow().value)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.state.borrow().loaded
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.state.borrow().torn_down
    }

    pub fn set(&self, value: T) {
        self.update(move |_| value);
    }

    /// Derive the next value from the current one. Use this instead of
    /// `get` + `set` when several writes may be issued back to back.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let current = {
            let state = self.inner.state.borrow();
            if state.torn_down {
                log::warn!("Ignoring write to '{}' after teardown", self.inner.key);
                return;
            }
            state.value.clone()
        };

        let next = f(&current);
        let encoded = serde_json::to_value(&next);
        let (changed, loaded) = {
            let mut state = self.inner.state.borrow_mut();
            let changed = state.value != next;
            state.value = next;
            (changed, state.loaded)
        };

        if changed {
            self.inner.emit();
        }

        if !loaded {
            log::debug!(
                "Not persisting '{}' before its stored value has loaded",
                self.inner.key
            );
            return;
        }

        match encoded {
            Ok(value) => CellInner::enqueue(&self.inner, value),
            Err(e) => log::error!("Failed to encode '{}': {}", self.inner.key, e),
        }
    }

    /// Register a callback for every change of the in-memory value. The
    /// callback stays registered until the returned `Observer` is dropped.
    #[must_use = "dropping the Observer unregisters the callback"]
    pub fn observe(&self, f: impl Fn(&T) + 'static) -> Observer {
        let id = self.inner.next_observer_id.get();
        self.inner.next_observer_id.set(id + 1);
        self.inner.observers.borrow_mut().push((id, Rc::new(f)));

        let weak: Weak<CellInner<T>> = Rc::downgrade(&self.inner);
        Observer {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.observers.borrow_mut().retain(|(observer_id, _)| *observer_id != id);
                }
            })),
        }
    }

    /// Release the backend watch. Nothing changes this cell afterwards.
    pub fn teardown(&self) {
        let watch = {
            let mut state = self.inner.state.borrow_mut();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            self.inner.watch.borrow_mut().take()
        };

        if let Some(watch) = watch {
            watch.unwatch();
        }
        self.inner.observers.borrow_mut().clear();
        log::debug!("Tore down synced cell for '{}'", self.inner.key);
    }
}

impl<T> CellInner<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + 'static,
{
    fn apply_load(&self, result: Result<Option<Value>>) {
        let changed = {
            let mut state = self.state.borrow_mut();
            if state.torn_down {
                log::debug!("Discarding load of '{}' after teardown", self.key);
                return;
            }

            match result {
                Err(e) => {
                    log::error!("Failed to load '{}', keeping in-memory value: {}", self.key, e);
                    return;
                }
                Ok(Some(value)) if is_present(&value) => {
                    if state.notified {
                        // A notification is at least as recent as this read.
                        log::debug!("Discarding stale load of '{}'", self.key);
                        state.loaded = true;
                        return;
                    }
                    match serde_json::from_value::<T>(value) {
                        Ok(value) => {
                            state.loaded = true;
                            replace(&mut state.value, value)
                        }
                        Err(e) => {
                            log::error!("Stored value for '{}' is unreadable: {}", self.key, e);
                            return;
                        }
                    }
                }
                Ok(_) => {
                    state.loaded = true;
                    false
                }
            }
        };

        log::debug!("Loaded '{}'", self.key);
        if changed {
            self.emit();
        }
    }

    fn apply_notification(&self, value: Option<Value>) {
        let Some(value) = value.filter(is_present) else {
            log::debug!("Ignoring empty change notification for '{}'", self.key);
            return;
        };

        if self.own_writes.borrow().contains(&value) {
            log::debug!("Skipping echo of own write to '{}'", self.key);
            return;
        }

        let changed = {
            let mut state = self.state.borrow_mut();
            if state.torn_down {
                return;
            }
            match serde_json::from_value::<T>(value) {
                Ok(value) => {
                    state.loaded = true;
                    state.notified = true;
                    // Another context wrote; echoes of our remaining writes apply again.
                    self.own_writes.borrow_mut().clear();
                    replace(&mut state.value, value)
                }
                Err(e) => {
                    log::warn!("Ignoring malformed change notification for '{}': {}", self.key, e);
                    return;
                }
            }
        };

        if changed {
            self.emit();
        }
    }

    fn emit(&self) {
        let snapshot = self.state.borrow().value.clone();
        let observers: Vec<ObserverFn<T>> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        for observer in observers {
            observer(&snapshot);
        }
    }

    fn enqueue(this: &Rc<Self>, value: Value) {
        this.own_writes.borrow_mut().push(value.clone());
        this.outbox.borrow_mut().push_back(value);
        if this.flushing.replace(true) {
            return;
        }

        let this = this.clone();
        let spawner = this.spawner.clone();
        spawner.spawn(this.flush().boxed_local());
    }

    /// Persist queued writes one at a time, in the order they were issued.
    async fn flush(self: Rc<Self>) {
        loop {
            let next = self.outbox.borrow_mut().pop_front();
            let Some(value) = next else {
                break;
            };
            if let Err(e) = self.backend.set(&self.key, value).await {
                log::error!("Failed to persist '{}': {}", self.key, e);
            }
        }
        self.own_writes.borrow_mut().clear();
        self.flushing.set(false);
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

impl<T> Clone for SyncedCell<T> {
    fn clone(&self) -> Self {
        SyncedCell {
            inner: self.inner.clone(),
        }
    }
}

impl<T> PartialEq for SyncedCell<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SyncedCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SyncedCell")
            .field("key", &self.inner.key)
            .field("value", &state.value)
            .field("loaded", &state.loaded)
            .field("torn_down", &state.torn_down)
            .finish()
    }
}

/// Registration of a local change callback.
pub struct Observer {
    release: Option<Box<dyn FnOnce()>>,
}

impl Drop for Observer {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}
