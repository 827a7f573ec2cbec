/// Yew binding for synced cells

use crate::backend::ChromeStorage;
use crate::config::ExtensionConfig;
use crate::runtime::WasmSpawner;
use crate::synced::SyncedCell;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ops::Deref;
use std::rc::Rc;
use yew::prelude::*;

/// Value of a synced key plus the means to change it. Derefs to the value.
pub struct SyncedStorageHandle<T> {
    value: UseStateHandle<T>,
    cell: Rc<Option<SyncedCell<T>>>,
}

impl<T> SyncedStorageHandle<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + 'static,
{
    pub fn set(&self, value: T) {
        match self.cell.as_ref() {
            Some(cell) => cell.set(value),
            None => self.value.set(value),
        }
    }

    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        match self.cell.as_ref() {
            Some(cell) => cell.update(f),
            None => self.value.set(f(&self.value)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.as_ref().as_ref().is_some_and(|cell| cell.is_loaded())
    }
}

impl<T> Deref for SyncedStorageHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> Clone for SyncedStorageHandle<T> {
    fn clone(&self) -> Self {
        SyncedStorageHandle {
            value: self.value.clone(),
            cell: self.cell.clone(),
        }
    }
}

/// Bind component state to a storage key shared with the other extension
/// contexts. The cell lives as long as the component and is torn down on
/// unmount or when `key` or the configured storage area changes.
#[hook]
pub fn use_synced_storage<T>(key: &'static str, default: T) -> SyncedStorageHandle<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + 'static,
{
    let config = use_context::<ExtensionConfig>().unwrap_or_default();
    let initial = default.clone();

    let cell = use_memo((key, config.storage_area), move |(key, area)| {
        let backend = Rc::new(ChromeStorage::new(*area));
        match SyncedCell::new(backend, Rc::new(WasmSpawner), *key, default) {
            Ok(cell) => Some(cell),
            Err(e) => {
                log::error!("Cannot sync '{}', using component state only: {}", key, e);
                None
            }
        }
    });

    let value = {
        let cell = cell.clone();
        use_state_eq(move || match cell.as_ref() {
            Some(cell) => cell.get(),
            None => initial,
        })
    };

    {
        let value = value.clone();
        use_effect_with(cell.clone(), move |cell| {
            let observer = cell.as_ref().as_ref().map(|synced| {
                value.set(synced.get());
                let value = value.clone();
                synced.observe(move |next: &T| value.set(next.clone()))
            });

            let cell = cell.clone();
            move || {
                drop(observer);
                if let Some(synced) = cell.as_ref() {
                    synced.teardown();
                }
            }
        });
    }

    SyncedStorageHandle { value, cell }
}
