//! Selector-driven item extraction.
//!
//! Works against any [`RenderedPage`]. Failures on a single element are
//! logged and that element is skipped; they never abort the batch.

use crate::dates::parse_item_date;
use crate::models::{ScrapedItem, SelectorConfig};
use url::Url;

/// Maximum number of item elements inspected per page
pub const MAX_ITEMS: usize = 20;

/// Errors raised while evaluating selectors
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Element query failed: {0}")]
    Query(String),
}

/// A rendered document that can be queried with CSS selectors
pub trait RenderedPage {
    /// URL relative links are resolved against
    fn base_url(&self) -> &Url;

    fn select_all(&self, selector: &str) -> Result<Vec<Box<dyn PageElement + '_>>, ExtractError>;
}

/// One element of a [`RenderedPage`]
pub trait PageElement {
    /// Text of the first descendant matching `selector`, whitespace-collapsed
    fn text(&self, selector: &str) -> Result<Option<String>, ExtractError>;

    /// Attribute `name` of the first descendant matching `selector`
    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, ExtractError>;
}

/// Extract up to `limit` items from `page`.
pub fn extract_items(
    page: &dyn RenderedPage,
    config: &SelectorConfig,
    limit: usize,
) -> Vec<ScrapedItem> {
    let elements = match page.select_all(&config.item_selector) {
        Ok(elements) => elements,
        Err(e) => {
            log::warn!("Item selector failed on {}: {}", page.base_url(), e);
            return Vec::new();
        }
    };

    log::debug!(
        "Found {} elements for '{}' on {}",
        elements.len(),
        config.item_selector,
        page.base_url()
    );

    let mut items = Vec::new();
    for (index, element) in elements.iter().take(limit).enumerate() {
        match extract_item(element.as_ref(), page.base_url(), config) {
            Ok(Some(item)) => items.push(item),
            Ok(None) => log::debug!("Element {} has no title or link, skipping", index),
            Err(e) => log::warn!("Error parsing item {}: {}", index, e),
        }
    }
    items
}

/// `Ok(None)` when the element lacks a title or a link.
fn extract_item(
    element: &dyn PageElement,
    base: &Url,
    config: &SelectorConfig,
) -> Result<Option<ScrapedItem>, ExtractError> {
    let title = element.text(&config.title_selector)?.filter(|t| !t.is_empty());

    let link = element
        .attribute(&config.link_selector, "href")?
        .and_then(|href| resolve_url(base, &href));

    let (Some(title), Some(link)) = (title, link) else {
        return Ok(None);
    };

    let description = match &config.description_selector {
        Some(selector) => element.text(selector)?.filter(|d| !d.is_empty()),
        None => None,
    };

    let image = match &config.image_selector {
        Some(selector) => element
            .attribute(selector, "src")?
            .map(|src| resolve_url(base, &src).unwrap_or(src)),
        None => None,
    };

    let published = match &config.date_selector {
        Some(selector) => element
            .text(selector)?
            .and_then(|text| parse_item_date(&text, &config.date_format)),
        None => None,
    };

    Ok(Some(ScrapedItem {
        title,
        link,
        description,
        image,
        published,
    }))
}

/// Resolve `href` against `base`; `None` for empty or unusable values.
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match base.join(href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            log::debug!("Cannot resolve '{}' against {}: {}", href, base, e);
            None
        }
    }
}
