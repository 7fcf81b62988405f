//! Rendered HTML parsed with `scraper`, queried by the extraction engine.

use crate::extract::{ExtractError, PageElement, RenderedPage};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Selectors tried by the debug view when looking for item containers
pub const CANDIDATE_SELECTORS: &[&str] = &[
    "article",
    ".article",
    ".post",
    ".story",
    ".card",
    ".story-card",
    ".news-item",
    ".entry",
    "[class*='story']",
    "[class*='article']",
    "[class*='post']",
    "[class*='card']",
];

/// Snapshot of a rendered page
pub struct HtmlPage {
    document: Html,
    base_url: Url,
}

impl HtmlPage {
    pub fn parse(html: &str, base_url: Url) -> Self {
        Self {
            document: Html::parse_document(html),
            base_url,
        }
    }

    /// Number of elements matching `selector`
    pub fn count_matches(&self, selector: &str) -> Result<usize, ExtractError> {
        let selector = parse_selector(selector)?;
        Ok(self.document.select(&selector).count())
    }

    /// `(selector, count)` for every candidate selector with at least one match
    pub fn candidate_counts(&self) -> Vec<(String, usize)> {
        CANDIDATE_SELECTORS
            .iter()
            .filter_map(|selector| match self.count_matches(selector) {
                Ok(0) | Err(_) => None,
                Ok(count) => Some((selector.to_string(), count)),
            })
            .collect()
    }
}

impl RenderedPage for HtmlPage {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn select_all(&self, selector: &str) -> Result<Vec<Box<dyn PageElement + '_>>, ExtractError> {
        let selector = parse_selector(selector)?;
        Ok(self
            .document
            .select(&selector)
            .map(|element| Box::new(HtmlElement { element }) as Box<dyn PageElement + '_>)
            .collect())
    }
}

struct HtmlElement<'a> {
    element: ElementRef<'a>,
}

impl<'a> HtmlElement<'a> {
    fn first(&self, selector: &str) -> Result<Option<ElementRef<'a>>, ExtractError> {
        let selector = parse_selector(selector)?;
        Ok(self.element.select(&selector).next())
    }
}

impl PageElement for HtmlElement<'_> {
    fn text(&self, selector: &str) -> Result<Option<String>, ExtractError> {
        Ok(self.first(selector)?.map(|el| collapse_whitespace(el.text())))
    }

    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, ExtractError> {
        Ok(self
            .first(selector)?
            .and_then(|el| el.value().attr(name))
            .map(|value| value.trim().to_string()))
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
