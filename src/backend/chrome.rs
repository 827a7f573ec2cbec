/// Backend over the WebExtension storage API (chrome.storage / browser.storage)

use super::{StorageBackend, Unwatch, WatchCallback};
use crate::config::StorageArea;
use crate::error::{self, StorageError};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/storage.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(area: &str, key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(area: &str, key: &str, value: JsValue) -> Result<(), JsValue>;

    fn watchStorage(area: &str, key: &str, callback: &js_sys::Function) -> js_sys::Function;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeStorage {
    area: StorageArea,
}

impl ChromeStorage {
    pub fn new(area: StorageArea) -> Self {
        ChromeStorage { area }
    }

    pub fn area(&self) -> StorageArea {
        self.area
    }
}

impl Default for ChromeStorage {
    fn default() -> Self {
        Self::new(StorageArea::Local)
    }
}

#[async_trait(?Send)]
impl StorageBackend for ChromeStorage {
    async fn get(&self, key: &str) -> error::Result<Option<Value>> {
        let value_js = getStorage(self.area.as_str(), key)
            .await
            .map_err(|e| StorageError::Js(format!("Failed to get '{}': {:?}", key, e)))?;
        from_js(value_js)
    }

    async fn set(&self, key: &str, value: Value) -> error::Result<()> {
        let value_js = to_js(&value)?;
        setStorage(self.area.as_str(), key, value_js)
            .await
            .map_err(|e| StorageError::Js(format!("Failed to set '{}': {:?}", key, e)))
    }

    fn watch(&self, key: &str, callback: WatchCallback) -> Unwatch {
        let watched_key = key.to_string();
        let listener = Closure::wrap(Box::new(move |value_js: JsValue| {
            match from_js(value_js) {
                Ok(value) => callback(value),
                Err(e) => log::warn!("Dropping change for '{}': {}", watched_key, e),
            }
        }) as Box<dyn FnMut(JsValue)>);

        let stop = watchStorage(self.area.as_str(), key, listener.as_ref().unchecked_ref());

        let key = key.to_string();
        Unwatch::new(move || {
            if let Err(e) = stop.call0(&JsValue::NULL) {
                log::warn!("Failed to unwatch '{}': {:?}", key, e);
            }
            // Release may run inside the listener itself (an observer tearing
            // the cell down), so free the closure once that call has returned.
            wasm_bindgen_futures::spawn_local(async move {
                drop(listener);
            });
        })
    }
}

fn from_js(value_js: JsValue) -> error::Result<Option<Value>> {
    if value_js.is_null() || value_js.is_undefined() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value::<Value>(value_js)
        .map(Some)
        .map_err(|e| StorageError::Js(format!("Failed to parse stored value: {:?}", e)))
}

fn to_js(value: &Value) -> error::Result<JsValue> {
    // Plain objects rather than JS Maps, so other contexts read the same shape.
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| StorageError::Js(format!("Failed to serialize value: {:?}", e)))
}
