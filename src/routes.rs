//! HTTP handlers
//!
//! Scrapes block on the browser lock and on page loads, so they run on
//! actix's blocking thread pool through `web::block`.

use crate::app_state::AppState;
use crate::cache::fingerprint;
use crate::feed::render_feed;
use crate::models::{SelectorConfig, SelectorParams};
use crate::pages;
use crate::scrape::ScrapeError;
use crate::stats::ScrapeMetrics;
use actix_web::{get, web, HttpResponse};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

const RSS_CONTENT_TYPE: &str = "application/rss+xml";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

type QueryMap = web::Query<HashMap<String, String>>;

/// Register every route on an app or scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(home)
        .service(feed)
        .service(debug_view)
        .service(stats);
}

#[get("/")]
async fn home() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(HTML_CONTENT_TYPE)
        .body(pages::home_page())
}

#[get("/feed")]
async fn feed(data: web::Data<AppState>, query: QueryMap) -> HttpResponse {
    data.stats.record_feed_request();

    let url = match required_url(&query) {
        Some(url) => url,
        None => return text_response(HttpResponse::BadRequest(), "Missing 'url' parameter"),
    };

    let config = SelectorConfig::from_params(&selector_params(&query));
    let key = fingerprint(&url, &config);

    if let Some(entry) = data.cache.get(&key) {
        log::debug!("Cache hit for {}", url);
        data.stats.record_cache_hit();
        return rss_response(entry.body);
    }
    log::debug!("Cache miss for {}", url);

    let started = Instant::now();
    let state = data.clone();
    let (scrape_url, scrape_config) = (url.clone(), config.clone());
    let result = web::block(move || state.scraper.scrape(&scrape_url, &scrape_config)).await;

    let items = match result {
        Ok(Ok(items)) => items,
        Ok(Err(e)) => {
            data.stats.record_failure(&e);
            return feed_error_response(&e);
        }
        Err(e) => {
            log::error!("Scrape worker failed for {}: {}", url, e);
            return text_response(HttpResponse::InternalServerError(), "Internal error");
        }
    };

    data.stats.record_success(items.len(), started.elapsed());

    if items.is_empty() {
        return text_response(
            HttpResponse::NotFound(),
            "No items found. Check your CSS selectors.",
        );
    }

    let body = render_feed(&items, &url);
    data.cache.put(key, body.clone());
    rss_response(body)
}

#[get("/debug")]
async fn debug_view(data: web::Data<AppState>, query: QueryMap) -> HttpResponse {
    data.stats.record_debug_request();

    let url = match required_url(&query) {
        Some(url) => url,
        None => return text_response(HttpResponse::BadRequest(), "Missing 'url' parameter"),
    };

    let state = data.clone();
    let inspect_url = url.clone();
    let result = web::block(move || state.scraper.inspect(&inspect_url)).await;

    match result {
        Ok(Ok(inspection)) => HttpResponse::Ok()
            .content_type(HTML_CONTENT_TYPE)
            .body(pages::debug_page(&url, &inspection)),
        Ok(Err(e)) => {
            data.stats.record_failure(&e);
            let mut builder = match e {
                ScrapeError::InvalidUrl { .. } => HttpResponse::BadRequest(),
                ScrapeError::Timeout(_) => HttpResponse::GatewayTimeout(),
                _ => HttpResponse::InternalServerError(),
            };
            builder
                .content_type(TEXT_CONTENT_TYPE)
                .body(format!("Error: {}", e))
        }
        Err(e) => {
            log::error!("Debug worker failed for {}: {}", url, e);
            text_response(HttpResponse::InternalServerError(), "Internal error")
        }
    }
}

#[derive(Serialize)]
struct StatsResponse {
    #[serde(flatten)]
    metrics: ScrapeMetrics,
    cache_hit_rate: f64,
    cache_entries: usize,
    browser_launches: u64,
    browser_relaunches: u64,
    /// `null` while a scrape holds the browser
    browser_running: Option<bool>,
}

#[get("/stats")]
async fn stats(data: web::Data<AppState>) -> HttpResponse {
    let metrics = data.stats.snapshot();
    let browser = data.scraper.browser();

    HttpResponse::Ok().json(StatsResponse {
        cache_hit_rate: metrics.cache_hit_rate(),
        metrics,
        cache_entries: data.cache.len(),
        browser_launches: browser.launch_count(),
        browser_relaunches: browser.relaunch_count(),
        browser_running: browser.is_running(),
    })
}

fn required_url(query: &QueryMap) -> Option<String> {
    query
        .get("url")
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

fn selector_params(query: &QueryMap) -> SelectorParams {
    let get = |name: &str| query.get(name).cloned();
    SelectorParams {
        item: get("item"),
        title: get("title"),
        link: get("link"),
        desc: get("desc"),
        img: get("img"),
        date: get("date"),
        datefmt: get("datefmt"),
    }
}

/// Status and a short message for a failed feed scrape. Details stay in the log.
fn feed_error_response(err: &ScrapeError) -> HttpResponse {
    match err {
        ScrapeError::InvalidUrl { .. } => {
            text_response(HttpResponse::BadRequest(), "Invalid 'url' parameter")
        }
        ScrapeError::Timeout(_) => {
            text_response(HttpResponse::GatewayTimeout(), "Timed out loading the page")
        }
        ScrapeError::BrowserCrash(_) | ScrapeError::BrowserUnavailable(_) => text_response(
            HttpResponse::ServiceUnavailable(),
            "Browser unavailable, try again later",
        ),
        ScrapeError::Unknown(_) => {
            text_response(HttpResponse::InternalServerError(), "Failed to scrape the page")
        }
    }
}

fn text_response(mut builder: actix_web::HttpResponseBuilder, message: &'static str) -> HttpResponse {
    builder.content_type(TEXT_CONTENT_TYPE).body(message)
}

fn rss_response(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(RSS_CONTENT_TYPE).body(body)
}
