/// Favourited chats and the operations the favorites views perform on them

use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use url::Url;

/// File name offered when exporting favourites
pub const EXPORT_FILE_NAME: &str = "chatgps-favorites.json";

const FALLBACK_CHAT_URL: &str = "https://chat.com/c/";

/// A message the user starred, with enough context to jump back to it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavouritedChat {
    pub icon_name: String,
    pub chat_id: String,
    pub scroll_top: f64,
    pub preview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl FavouritedChat {
    /// Where to navigate when the chat is not the current page.
    pub fn open_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("{}{}", FALLBACK_CHAT_URL, self.chat_id),
        }
    }

    pub fn provider(&self) -> Provider {
        Provider::from_name(self.provider.as_deref())
    }

    /// Whether this favourite belongs to the chat open at `page_url`.
    pub fn is_on_page(&self, page_url: &str) -> bool {
        extract_chat_id(page_url).is_some_and(|id| id == self.chat_id)
    }
}

/// Favourites keyed by a unique id per starred message
pub type Favourites = BTreeMap<String, FavouritedChat>;

pub fn add_favourite(favourites: &Favourites, id: &str, chat: FavouritedChat) -> Favourites {
    let mut next = favourites.clone();
    next.insert(id.to_string(), chat);
    next
}

pub fn remove_favourite(favourites: &Favourites, id: &str) -> Favourites {
    let mut next = favourites.clone();
    next.remove(id);
    next
}

/// Star an unstarred message, unstar a starred one.
pub fn toggle_favourite(favourites: &Favourites, id: &str, chat: FavouritedChat) -> Favourites {
    if favourites.contains_key(id) {
        remove_favourite(favourites, id)
    } else {
        add_favourite(favourites, id, chat)
    }
}

pub fn export_json(favourites: &Favourites) -> Result<String> {
    Ok(serde_json::to_string_pretty(favourites)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    ChatGpt,
    Gemini,
    Claude,
    Unknown,
}

impl Provider {
    /// Providers are stored as free-form names; match on substrings.
    pub fn from_name(name: Option<&str>) -> Provider {
        let Some(name) = name else {
            return Provider::Unknown;
        };
        if name.contains("chatgpt") {
            Provider::ChatGpt
        } else if name.contains("gemini") {
            Provider::Gemini
        } else if name.contains("claude") {
            Provider::Claude
        } else {
            Provider::Unknown
        }
    }

    pub fn favicon_url(&self) -> Option<&'static str> {
        match self {
            Provider::ChatGpt => Some("https://chatgpt.com/favicon.ico"),
            Provider::Gemini => {
                Some("https://www.google.com/s2/favicons?domain=gemini.google.com&sz=32")
            }
            Provider::Claude => Some("https://claude.ai/favicon.ico"),
            Provider::Unknown => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Provider::ChatGpt => "ChatGPT",
            Provider::Gemini => "Gemini",
            Provider::Claude => "Claude",
            Provider::Unknown => "Unknown Provider",
        }
    }
}

fn chat_path_regex() -> &'static Regex {
    static CHAT_PATH: OnceLock<Regex> = OnceLock::new();
    CHAT_PATH.get_or_init(|| {
        Regex::new(r"/(?:c|app|chat)/([A-Za-z0-9_-]+)").expect("chat path pattern is valid")
    })
}

/// Conversation id from a ChatGPT (`/c/<id>`), Gemini (`/app/<id>`) or
/// Claude (`/chat/<id>`) URL.
pub fn extract_chat_id(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    chat_path_regex()
        .captures(parsed.path())
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_chat(chat_id: &str, preview: &str) -> FavouritedChat {
        FavouritedChat {
            icon_name: "assistant".to_string(),
            chat_id: chat_id.to_string(),
            scroll_top: 640.0,
            preview: preview.to_string(),
            url: None,
            title: None,
            provider: None,
        }
    }

    #[test]
    fn test_add_and_remove_favourite() {
        let favourites = add_favourite(&Favourites::new(), "msg-1", create_test_chat("abc", "Hello"));
        assert_eq!(favourites.len(), 1);

        let removed = remove_favourite(&favourites, "msg-1");

        assert!(removed.is_empty());
        assert_eq!(favourites.len(), 1);
    }

    #[test]
    fn test_remove_nonexistent_favourite() {
        let favourites = add_favourite(&Favourites::new(), "msg-1", create_test_chat("abc", "Hello"));
        assert_eq!(remove_favourite(&favourites, "missing"), favourites);
    }

    #[test]
    fn test_toggle_favourite() {
        let chat = create_test_chat("abc", "Hello");

        let starred = toggle_favourite(&Favourites::new(), "msg-1", chat.clone());
        assert!(starred.contains_key("msg-1"));

        let unstarred = toggle_favourite(&starred, "msg-1", chat);
        assert!(unstarred.is_empty());
    }

    #[test]
    fn test_open_url_prefers_stored_url() {
        let mut chat = create_test_chat("abc", "Hello");
        assert_eq!(chat.open_url(), "https://chat.com/c/abc");

        chat.url = Some("https://claude.ai/chat/xyz".to_string());
        assert_eq!(chat.open_url(), "https://claude.ai/chat/xyz");
    }

    #[test]
    fn test_provider_from_name() {
        assert_eq!(Provider::from_name(None), Provider::Unknown);
        assert_eq!(Provider::from_name(Some("chatgpt")), Provider::ChatGpt);
        assert_eq!(Provider::from_name(Some("google-gemini")), Provider::Gemini);
        assert_eq!(Provider::from_name(Some("claude")), Provider::Claude);
        assert_eq!(Provider::from_name(Some("mistral")), Provider::Unknown);
        assert_eq!(Provider::Unknown.favicon_url(), None);
    }

    #[test]
    fn test_extract_chat_id() {
        assert_eq!(
            extract_chat_id("https://chatgpt.com/c/6740-abcd?model=x"),
            Some("6740-abcd".to_string())
        );
        assert_eq!(
            extract_chat_id("https://gemini.google.com/app/f00ba4"),
            Some("f00ba4".to_string())
        );
        assert_eq!(
            extract_chat_id("https://claude.ai/chat/1a2b-3c"),
            Some("1a2b-3c".to_string())
        );
        assert_eq!(extract_chat_id("https://chatgpt.com/"), None);
        assert_eq!(extract_chat_id("not a url"), None);
    }

    #[test]
    fn test_is_on_page() {
        let chat = create_test_chat("abc", "Hello");
        assert!(chat.is_on_page("https://chatgpt.com/c/abc"));
        assert!(!chat.is_on_page("https://chatgpt.com/c/other"));
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let mut chat = create_test_chat("abc", "Hello");
        chat.provider = Some("chatgpt".to_string());

        let json = serde_json::to_value(&chat).unwrap();

        assert_eq!(json["chatId"], "abc");
        assert_eq!(json["scrollTop"], 640.0);
        assert_eq!(json["iconName"], "assistant");
        assert!(json.get("url").is_none());

        let deserialized: FavouritedChat = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, chat);
    }

    #[test]
    fn test_export_json() {
        let favourites = add_favourite(&Favourites::new(), "msg-1", create_test_chat("abc", "Hello"));

        let json = export_json(&favourites).unwrap();

        assert!(json.contains("\"msg-1\""));
        assert!(json.contains('\n'));
    }
}
