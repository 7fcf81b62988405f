// Library interface for js_rss_feeds
// The binary and the integration tests build on these modules

pub mod app_state;
pub mod browser;
pub mod cache;
pub mod config;
pub mod dates;
pub mod document;
pub mod extract;
pub mod feed;
pub mod helpers;
pub mod logging;
pub mod models;
pub mod pages;
pub mod routes;
pub mod scrape;
pub mod stats;
