use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ITEM_SELECTOR: &str = "article";
pub const DEFAULT_TITLE_SELECTOR: &str = "h2, h3, h4";
pub const DEFAULT_LINK_SELECTOR: &str = "a";
pub const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y";

/// CSS selectors describing how to turn a page into feed items.
///
/// Selectors inside an item (`title`, `link`, ...) are evaluated relative to
/// each element matched by `item_selector`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub item_selector: String,
    pub title_selector: String,
    pub link_selector: String,
    pub description_selector: Option<String>,
    pub image_selector: Option<String>,
    pub date_selector: Option<String>,
    pub date_format: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item_selector: DEFAULT_ITEM_SELECTOR.to_string(),
            title_selector: DEFAULT_TITLE_SELECTOR.to_string(),
            link_selector: DEFAULT_LINK_SELECTOR.to_string(),
            description_selector: None,
            image_selector: None,
            date_selector: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// Raw selector values as they arrive in a request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectorParams {
    pub item: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub desc: Option<String>,
    pub img: Option<String>,
    pub date: Option<String>,
    pub datefmt: Option<String>,
}

impl SelectorConfig {
    /// Build a config from request values. Blank values count as missing.
    pub fn from_params(params: &SelectorParams) -> Self {
        let or_default = |value: &Option<String>, default: &str| {
            non_blank(value).unwrap_or_else(|| default.to_string())
        };

        Self {
            item_selector: or_default(&params.item, DEFAULT_ITEM_SELECTOR),
            title_selector: or_default(&params.title, DEFAULT_TITLE_SELECTOR),
            link_selector: or_default(&params.link, DEFAULT_LINK_SELECTOR),
            description_selector: non_blank(&params.desc),
            image_selector: non_blank(&params.img),
            date_selector: non_blank(&params.date),
            date_format: or_default(&params.datefmt, DEFAULT_DATE_FORMAT),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// One entry extracted from a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedItem {
    pub title: String,
    /// Absolute URL
    pub link: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_params() {
        let config = SelectorConfig::from_params(&SelectorParams::default());
        assert_eq!(config, SelectorConfig::default());
    }

    #[test]
    fn test_blank_params_are_ignored() {
        let params = SelectorParams {
            item: Some("  ".to_string()),
            title: Some(" h6 ".to_string()),
            desc: Some(String::new()),
            img: Some("img".to_string()),
            ..SelectorParams::default()
        };
        let config = SelectorConfig::from_params(&params);
        assert_eq!(config.item_selector, DEFAULT_ITEM_SELECTOR);
        assert_eq!(config.title_selector, "h6");
        assert_eq!(config.description_selector, None);
        assert_eq!(config.image_selector.as_deref(), Some("img"));
    }
}
