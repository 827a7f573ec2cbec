/// Outline filter options
use std::collections::BTreeMap;

/// Which message kinds the outline shows, by label.
pub type FilterOptions = BTreeMap<String, bool>;

pub fn default_filters() -> FilterOptions {
    [
        ("user", true),
        ("assistant", true),
        ("code blocks", false),
        ("section headers", true),
    ]
    .into_iter()
    .map(|(label, enabled)| (label.to_string(), enabled))
    .collect()
}

/// Flip one option. An unknown label starts out disabled, so it toggles on.
pub fn toggle_option(options: &FilterOptions, label: &str) -> FilterOptions {
    let mut next = options.clone();
    let enabled = next.get(label).copied().unwrap_or(false);
    next.insert(label.to_string(), !enabled);
    next
}

/// True when at least one option hides something.
pub fn any_filters_active(options: &FilterOptions) -> bool {
    options.values().any(|enabled| !enabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters() {
        let options = default_filters();

        assert_eq!(options.len(), 4);
        assert_eq!(options.get("user"), Some(&true));
        assert_eq!(options.get("code blocks"), Some(&false));
    }

    #[test]
    fn test_toggle_option() {
        let options = default_filters();

        let toggled = toggle_option(&options, "assistant");

        assert_eq!(toggled.get("assistant"), Some(&false));
        assert_eq!(options.get("assistant"), Some(&true));
    }

    #[test]
    fn test_toggle_unknown_option() {
        let toggled = toggle_option(&FilterOptions::new(), "images");
        assert_eq!(toggled.get("images"), Some(&true));
    }

    #[test]
    fn test_any_filters_active() {
        assert!(any_filters_active(&default_filters()));

        let all_on = toggle_option(&default_filters(), "code blocks");
        assert!(!any_filters_active(&all_on));
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(default_filters()).unwrap();
        assert_eq!(json["section headers"], serde_json::json!(true));
    }
}
