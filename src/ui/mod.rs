/// UI module exports
pub mod components;
pub mod favorites;
pub mod hooks;
pub mod overlay;
