/// Extension configuration: which storage area backs the cells and how much to log

use serde::{Deserialize, Serialize};

/// WebExtension storage area holding the synced values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    #[default]
    Local,
    Session,
    Sync,
}

impl StorageArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageArea::Local => "local",
            StorageArea::Session => "session",
            StorageArea::Sync => "sync",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtensionConfig {
    pub storage_area: StorageArea,
    pub log_level: LogLevel,
}

impl ExtensionConfig {
    /// Parse a config object; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtensionConfig::default();
        assert_eq!(config.storage_area, StorageArea::Local);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ExtensionConfig::from_json(r#"{"storageArea": "sync"}"#).unwrap();
        assert_eq!(config.storage_area, StorageArea::Sync);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_from_json_empty_object() {
        assert_eq!(ExtensionConfig::from_json("{}").unwrap(), ExtensionConfig::default());
    }

    #[test]
    fn test_from_json_rejects_unknown_area() {
        assert!(ExtensionConfig::from_json(r#"{"storageArea": "managed-ish"}"#).is_err());
    }

    #[test]
    fn test_area_names() {
        assert_eq!(StorageArea::Local.as_str(), "local");
        assert_eq!(StorageArea::Session.as_str(), "session");
        assert_eq!(StorageArea::Sync.as_str(), "sync");
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(log::Level::from(LogLevel::Debug), log::Level::Debug);
    }
}
