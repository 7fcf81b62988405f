//! Request and scrape statistics
//!
//! Tracks cache effectiveness, scrape outcomes by failure kind, and timing.

use crate::scrape::ScrapeError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeMetrics {
    pub feed_requests: u64,
    pub debug_requests: u64,
    pub cache_hits: u64,
    pub successful_scrapes: u64,
    pub empty_scrapes: u64,
    pub failed_scrapes: u64,
    pub timeouts: u64,
    pub browser_crashes: u64,
    pub browser_unavailable: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub average_scrape_time_ms: f64,
    pub total_scrape_time_ms: u64,
}

impl ScrapeMetrics {
    pub fn cache_hit_rate(&self) -> f64 {
        if self.feed_requests == 0 {
            0.0
        } else {
            (self.cache_hits as f64 / self.feed_requests as f64) * 100.0
        }
    }

    fn record_scrape_time(&mut self, elapsed: Duration) {
        self.total_scrape_time_ms += elapsed.as_millis() as u64;
        let completed = self.successful_scrapes + self.empty_scrapes;
        if completed > 0 {
            self.average_scrape_time_ms = self.total_scrape_time_ms as f64 / completed as f64;
        }
    }
}

/// Thread-safe wrapper shared by all handlers
#[derive(Default)]
pub struct ScrapeStats {
    metrics: Mutex<ScrapeMetrics>,
}

impl ScrapeStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, f: impl FnOnce(&mut ScrapeMetrics)) {
        let mut metrics = self.metrics.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *metrics);
    }

    pub fn record_feed_request(&self) {
        self.update(|m| m.feed_requests += 1);
    }

    pub fn record_debug_request(&self) {
        self.update(|m| m.debug_requests += 1);
    }

    pub fn record_cache_hit(&self) {
        self.update(|m| m.cache_hits += 1);
    }

    /// A scrape that finished, with `item_count` items found
    pub fn record_success(&self, item_count: usize, elapsed: Duration) {
        self.update(|m| {
            if item_count == 0 {
                m.empty_scrapes += 1;
            } else {
                m.successful_scrapes += 1;
                m.last_success = Some(Utc::now());
            }
            m.record_scrape_time(elapsed);
        });

        log::info!(
            "Scrape finished - {} items in {}ms",
            item_count,
            elapsed.as_millis()
        );
    }

    pub fn record_failure(&self, error: &ScrapeError) {
        self.update(|m| {
            m.failed_scrapes += 1;
            m.last_failure = Some(Utc::now());
            m.last_error = Some(error.to_string());
            match error {
                ScrapeError::Timeout(_) => m.timeouts += 1,
                ScrapeError::BrowserCrash(_) => m.browser_crashes += 1,
                ScrapeError::BrowserUnavailable(_) => m.browser_unavailable += 1,
                ScrapeError::InvalidUrl { .. } | ScrapeError::Unknown(_) => {}
            }
        });

        log::warn!("Scrape failed - {}", error);
    }

    pub fn snapshot(&self) -> ScrapeMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
