use actix_web::{web, App, HttpServer};
use js_rss_feeds::app_state::AppState;
use js_rss_feeds::{config, logging, routes};
use log::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cfg = config::Config::load();
    let server_cfg = cfg.server.clone();

    info!("Browser settings:");
    info!("  Headless: {}", cfg.browser.headless);
    info!("  Navigation timeout: {}s", cfg.scrape.navigation_timeout_secs);
    info!("  Settle delay: {}ms", cfg.scrape.settle_delay_ms);
    info!("  Cache freshness: {}s", cfg.cache.freshness_secs);

    let data = web::Data::new(AppState::init(cfg));

    // Try the configured port first, then the ones after it
    let first = server_cfg.port;
    let last = first.saturating_add(server_cfg.port_fallback_span);
    let mut last_err: Option<std::io::Error> = None;
    let mut result = None;

    for port in first..=last {
        let data_clone = data.clone();
        let addr = format!("{}:{}", server_cfg.host, port);
        match HttpServer::new(move || {
            App::new()
                .app_data(data_clone.clone())
                .configure(routes::configure)
        })
        .bind(&addr)
        {
            Ok(server) => {
                info!("Listening on {}", addr);
                result = Some(server.run().await);
                break;
            }
            Err(e) => {
                error!("Could not bind {}: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    info!("Shutting down browser");
    data.shutdown();

    result.unwrap_or_else(|| {
        Err(last_err.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                format!("No available ports {}-{}", first, last),
            )
        }))
    })
}
