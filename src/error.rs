/// Error types for storage access
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("javascript error: {0}")]
    Js(String),

    #[error("storage key must not be empty")]
    InvalidKey,
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error_converts() {
        let err: StorageError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, StorageError::Serialization(_)));
        assert!(err.to_string().starts_with("serialization error"));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            StorageError::Backend("quota exceeded".to_string()).to_string(),
            "storage backend error: quota exceeded"
        );
        assert_eq!(StorageError::InvalidKey.to_string(), "storage key must not be empty");
    }
}
