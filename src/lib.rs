/// ChatGPS - chat navigation and favorites overlay
/// Built with Rust + WASM + Yew

pub mod backend;
pub mod config;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod keys;
pub mod messages;
pub mod runtime;
pub mod synced;
pub mod ui;

pub use backend::{ChromeStorage, MemoryBackend, StorageBackend, Unwatch};
pub use config::{ExtensionConfig, StorageArea};
pub use error::{Result, StorageError};
pub use synced::{Observer, SyncedCell};

use std::sync::Once;
use wasm_bindgen::prelude::*;

static LOGGER: Once = Once::new();

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}

fn init(config_json: Option<String>) -> ExtensionConfig {
    let config = match config_json.as_deref() {
        Some(json) => ExtensionConfig::from_json(json).unwrap_or_else(|e| {
            web_sys::console::warn_1(&format!("Invalid config, using defaults: {}", e).into());
            ExtensionConfig::default()
        }),
        None => ExtensionConfig::default(),
    };

    let level: log::Level = config.log_level.into();
    LOGGER.call_once(|| wasm_logger::init(wasm_logger::Config::new(level)));
    config
}

// Start the Yew app for the standalone favorites page
#[wasm_bindgen]
pub fn start_favorites_page(config_json: Option<String>) {
    let config = init(config_json);
    log::info!("Starting favorites page ({} storage)", config.storage_area.as_str());
    yew::Renderer::<ui::favorites::FavoritesPage>::with_props(ui::favorites::FavoritesPageProps {
        config,
    })
    .render();
}

// Start the Yew app for the overlay injected into chat pages
#[wasm_bindgen]
pub fn start_overlay(config_json: Option<String>) {
    let config = init(config_json);
    log::info!("Starting overlay ({} storage)", config.storage_area.as_str());
    yew::Renderer::<ui::overlay::Overlay>::with_props(ui::overlay::OverlayProps { config }).render();
}
