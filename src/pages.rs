//! HTML views: the usage page and the selector debug page.

use crate::helpers::html_escape;
use crate::scrape::PageInspection;

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Custom RSS Generator</title></head>
<body style="font-family: Arial; max-width: 800px; margin: 50px auto; padding: 20px;">
    <h1>Custom RSS Feed Generator</h1>
    <p>Generate RSS feeds from JavaScript-rendered websites.</p>

    <h2>Usage</h2>
    <pre style="background: #f4f4f4; padding: 15px; border-radius: 5px;">
GET /feed?url=WEBSITE_URL&amp;item=CSS_SELECTOR&amp;title=CSS_SELECTOR&amp;link=CSS_SELECTOR

Parameters:
- url     (required): Website URL to scrape
- item    (optional): CSS selector for each item (default: article)
- title   (optional): CSS selector for title (default: h2, h3, h4)
- link    (optional): CSS selector for link (default: a)
- desc    (optional): CSS selector for description
- img     (optional): CSS selector for image
- date    (optional): CSS selector for publication date
- datefmt (optional): date format, strftime style (default: %d-%m-%Y)

GET /debug?url=WEBSITE_URL   shows candidate selectors and the rendered HTML
GET /stats                   scraper and cache statistics (JSON)
    </pre>

    <h2>Example</h2>
    <pre style="background: #f4f4f4; padding: 15px; border-radius: 5px;">
/feed?url=https://news.bitcoin.com/press-releases/&amp;item=.story-card&amp;title=h6&amp;link=a&amp;img=img
    </pre>

    <h2>Try It</h2>
    <form action="/feed" method="get" style="background: #f9f9f9; padding: 20px; border-radius: 5px;">
        <p><label>URL: <input type="text" name="url" style="width: 400px;" placeholder="https://example.com"></label></p>
        <p><label>Item selector: <input type="text" name="item" value="article" style="width: 200px;"></label></p>
        <p><label>Title selector: <input type="text" name="title" value="h2, h3, h4" style="width: 200px;"></label></p>
        <p><label>Link selector: <input type="text" name="link" value="a" style="width: 200px;"></label></p>
        <p><label>Description selector: <input type="text" name="desc" style="width: 200px;"></label></p>
        <p><label>Image selector: <input type="text" name="img" style="width: 200px;"></label></p>
        <p><label>Date selector: <input type="text" name="date" style="width: 200px;"></label></p>
        <p><label>Date format: <input type="text" name="datefmt" value="%d-%m-%Y" style="width: 200px;"></label></p>
        <p><button type="submit">Generate Feed</button></p>
    </form>
</body>
</html>
"#;

pub fn home_page() -> &'static str {
    HOME_PAGE
}

/// Debug view for `url`. Everything taken from the page is escaped.
pub fn debug_page(url: &str, inspection: &PageInspection) -> String {
    let url = html_escape(url);

    let selectors = if inspection.candidates.is_empty() {
        "No common selectors found".to_string()
    } else {
        inspection
            .candidates
            .iter()
            .map(|(selector, count)| format!("{}: {} elements found", html_escape(selector), count))
            .collect::<Vec<_>>()
            .join("<br>")
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Debug: {url}</title></head>
<body style="font-family: monospace;">
    <h1>Debug: {url}</h1>
    <h2>Potential selectors found:</h2>
    <pre>{selectors}</pre>
    <h2>Page HTML (first {limit} chars):</h2>
    <textarea style="width:100%; height:500px;">{html}</textarea>
</body>
</html>
"#,
        url = url,
        selectors = selectors,
        limit = crate::scrape::SNAPSHOT_CHARS,
        html = html_escape(&inspection.html_snapshot),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_page_lists_all_parameters() {
        for name in ["url", "item", "title", "link", "desc", "img", "date", "datefmt"] {
            assert!(home_page().contains(&format!(r#"name="{}""#, name)), "{}", name);
        }
    }

    #[test]
    fn test_debug_page_escapes_content() {
        let inspection = PageInspection {
            candidates: vec![("[class*='card']".to_string(), 4)],
            html_snapshot: "<script>alert(1)</script>".to_string(),
        };
        let html = debug_page("https://example.com/?q=<x>", &inspection);
        assert!(html.contains("[class*=&#39;card&#39;]: 4 elements found"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Debug: https://example.com/?q=&lt;x&gt;"));
    }

    #[test]
    fn test_debug_page_without_candidates() {
        let inspection = PageInspection {
            candidates: vec![],
            html_snapshot: String::new(),
        };
        assert!(debug_page("https://example.com", &inspection).contains("No common selectors found"));
    }
}
