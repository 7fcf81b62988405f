//! Crash-aware page scraping
//!
//! Every scrape runs while holding the browser lock, so requests are served
//! one at a time by a single Chrome process. If the browser dies mid-scrape
//! it is relaunched and the scrape is retried once; timeouts and other
//! failures are reported immediately.

use crate::browser::{BrowserManager, EngineSession, PageSession, RenderError, RenderErrorKind};
use crate::document::HtmlPage;
use crate::extract::{extract_items, MAX_ITEMS};
use crate::helpers::truncate_chars;
use crate::models::{ScrapedItem, SelectorConfig};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Characters of rendered HTML kept for the debug view
pub const SNAPSHOT_CHARS: usize = 10_000;

/// Timing and retry bounds for a scrape
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    /// Upper bound on page navigation
    pub navigation_timeout: Duration,
    /// Fixed wait after navigation for client-side rendering
    pub settle_delay: Duration,
    /// Total attempts, including the first
    pub max_attempts: usize,
    /// Maximum items extracted per page, never above [`MAX_ITEMS`]
    pub max_items: usize,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(60),
            settle_delay: Duration::from_secs(5),
            max_attempts: 2,
            max_items: MAX_ITEMS,
        }
    }
}

/// Failures surfaced to callers of [`FeedScraper`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrapeError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Timed out loading page: {0}")]
    Timeout(String),

    #[error("Browser crashed: {0}")]
    BrowserCrash(String),

    #[error("Browser unavailable: {0}")]
    BrowserUnavailable(String),

    #[error("Scrape failed: {0}")]
    Unknown(String),
}

impl From<RenderError> for ScrapeError {
    fn from(err: RenderError) -> Self {
        match err.kind {
            RenderErrorKind::Timeout => ScrapeError::Timeout(err.message),
            RenderErrorKind::Crashed => ScrapeError::BrowserCrash(err.message),
            RenderErrorKind::Launch => ScrapeError::BrowserUnavailable(err.message),
            RenderErrorKind::Other => ScrapeError::Unknown(err.message),
        }
    }
}

/// What the debug view shows about a rendered page
#[derive(Debug, Clone)]
pub struct PageInspection {
    /// Candidate item selectors with their match counts
    pub candidates: Vec<(String, usize)>,
    /// Beginning of the rendered HTML
    pub html_snapshot: String,
}

pub struct FeedScraper {
    browser: Arc<BrowserManager>,
    settings: ScrapeSettings,
}

impl FeedScraper {
    pub fn new(browser: Arc<BrowserManager>, settings: ScrapeSettings) -> Self {
        Self { browser, settings }
    }

    /// Render `url` and extract items with `config`.
    pub fn scrape(&self, url: &str, config: &SelectorConfig) -> Result<Vec<ScrapedItem>, ScrapeError> {
        let base = parse_url(url)?;
        let limit = self.settings.max_items.min(MAX_ITEMS);

        self.with_rendered_html(base.as_str(), |html| {
            let page = HtmlPage::parse(html, base.clone());
            extract_items(&page, config, limit)
        })
    }

    /// Render `url` and report which common item selectors match.
    pub fn inspect(&self, url: &str) -> Result<PageInspection, ScrapeError> {
        let base = parse_url(url)?;

        self.with_rendered_html(base.as_str(), |html| {
            let page = HtmlPage::parse(html, base.clone());
            PageInspection {
                candidates: page.candidate_counts(),
                html_snapshot: truncate_chars(html, SNAPSHOT_CHARS).to_string(),
            }
        })
    }

    pub fn browser(&self) -> &Arc<BrowserManager> {
        &self.browser
    }

    pub fn settings(&self) -> &ScrapeSettings {
        &self.settings
    }

    /// Render `url` under the browser lock and hand the HTML to `process`.
    ///
    /// A crash on any attempt but the last forces a relaunch and a retry.
    fn with_rendered_html<T>(
        &self,
        url: &str,
        mut process: impl FnMut(&str) -> T,
    ) -> Result<T, ScrapeError> {
        let mut session = self.browser.lock();
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            log::info!("Rendering {} (attempt {}/{})", url, attempt, max_attempts);

            match self.render_once(&mut session, url) {
                Ok(html) => return Ok(process(&html)),
                Err(err) if err.is_crash() && attempt < max_attempts => {
                    log::warn!("Browser crashed while rendering {}: {}. Relaunching", url, err);
                    session.force_relaunch()?;
                    attempt += 1;
                }
                Err(err) => {
                    log::error!("Error scraping {}: {}", url, err);
                    return Err(err.into());
                }
            }
        }
    }

    /// One attempt: live engine, fresh page, navigate, settle, read HTML.
    /// The page is closed whatever the outcome.
    fn render_once(&self, session: &mut EngineSession<'_>, url: &str) -> Result<String, RenderError> {
        let engine = session.acquire_live_engine()?;
        let page = engine.open_page()?;

        let result = self.load(page.as_ref(), url);

        if let Err(e) = page.close() {
            log::debug!("Failed to close page for {}: {}", url, e);
        }
        result
    }

    fn load(&self, page: &dyn PageSession, url: &str) -> Result<String, RenderError> {
        page.navigate(url, self.settings.navigation_timeout)?;

        if !self.settings.settle_delay.is_zero() {
            std::thread::sleep(self.settings.settle_delay);
        }

        page.content()
    }
}

fn parse_url(url: &str) -> Result<Url, ScrapeError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ScrapeError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
