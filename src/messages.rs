/// Messages the background script sends to the content script

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeMessage {
    /// Keyboard command: open or close the panel
    ToggleUi,
    NextChat,
    PreviousChat,
    Other(String),
}

impl RuntimeMessage {
    /// Classify a message by its `type` field.
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "TOGGLE_UI" => RuntimeMessage::ToggleUi,
            "NEXT_CHAT" => RuntimeMessage::NextChat,
            "PREVIOUS_CHAT" => RuntimeMessage::PreviousChat,
            other => RuntimeMessage::Other(other.to_string()),
        }
    }
}

/// Whether a keydown with this `key` value should close the panel.
pub fn is_close_key(key: &str) -> bool {
    key == "Escape"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_message_types() {
        assert_eq!(RuntimeMessage::from_type("TOGGLE_UI"), RuntimeMessage::ToggleUi);
        assert_eq!(RuntimeMessage::from_type("NEXT_CHAT"), RuntimeMessage::NextChat);
        assert_eq!(RuntimeMessage::from_type("PREVIOUS_CHAT"), RuntimeMessage::PreviousChat);
    }

    #[test]
    fn test_unknown_message_type_is_kept() {
        assert_eq!(
            RuntimeMessage::from_type("toggle_ui"),
            RuntimeMessage::Other("toggle_ui".to_string())
        );
        assert_eq!(RuntimeMessage::from_type(""), RuntimeMessage::Other(String::new()));
    }

    #[test]
    fn test_only_escape_closes() {
        assert!(is_close_key("Escape"));
        assert!(!is_close_key("Esc"));
        assert!(!is_close_key("Enter"));
    }
}
