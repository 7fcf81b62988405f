//! Application state for the Actix-web server
//!
//! `AppState` is created once at startup, wrapped in `web::Data`, and shared
//! by every handler. It owns the browser (through [`FeedScraper`]), the feed
//! cache, and request statistics. Call [`AppState::shutdown`] when the
//! server stops so the Chrome process is terminated.

use crate::browser::{BrowserManager, EngineLauncher};
use crate::cache::FeedCache;
use crate::config::Config;
use crate::scrape::FeedScraper;
use crate::stats::ScrapeStats;
use std::sync::Arc;

/// Shared application state for Actix-web handlers
pub struct AppState {
    /// Serialized, crash-aware access to the single browser
    pub scraper: FeedScraper,
    /// Rendered feeds keyed by request fingerprint
    pub cache: FeedCache,
    /// Counters for `/stats`
    pub stats: ScrapeStats,
    /// Application configuration
    pub config: Config,
}

impl AppState {
    /// Build state backed by real Chrome. The browser starts on first use.
    pub fn init(config: Config) -> Self {
        let browser = Arc::new(BrowserManager::new(config.browser.clone()));
        Self::with_browser(config, browser)
    }

    /// Build state with a custom launcher
    pub fn with_launcher(config: Config, launcher: Box<dyn EngineLauncher>) -> Self {
        let browser = Arc::new(BrowserManager::with_launcher(config.browser.clone(), launcher));
        Self::with_browser(config, browser)
    }

    fn with_browser(config: Config, browser: Arc<BrowserManager>) -> Self {
        Self {
            scraper: FeedScraper::new(browser, config.scrape.settings()),
            cache: FeedCache::new(config.cache.freshness()),
            stats: ScrapeStats::new(),
            config,
        }
    }

    /// Terminate the browser process. Safe to call more than once.
    pub fn shutdown(&self) {
        self.scraper.browser().shutdown();
    }
}
