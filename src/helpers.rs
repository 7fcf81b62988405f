//! Small text utilities shared by the HTML views and the scraper.
//!
//! # Examples
//!
//! ```
//! use js_rss_feeds::helpers::{html_escape, truncate_chars};
//!
//! assert_eq!(html_escape("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
//! assert_eq!(truncate_chars("héllo", 2), "hé");
//! ```

/// Escape HTML special characters for embedding untrusted text in a page
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// First `max_chars` characters of `s`, never splitting a character
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
