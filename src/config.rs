use crate::browser::BrowserConfig;
use crate::scrape::ScrapeSettings;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default location of the configuration file
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to listen on
    #[serde(default = "default_host")]
    pub host: String,

    /// First port to try
    #[serde(default = "default_port")]
    pub port: u16,

    /// How many following ports to try when `port` is taken
    #[serde(default = "default_port_fallback_span")]
    pub port_fallback_span: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScrapeConfig {
    /// Page navigation timeout in seconds
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Wait after navigation for client-side rendering, in milliseconds
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Attempts per scrape; a crash on an earlier attempt triggers a relaunch
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Maximum items per feed, capped at `extract::MAX_ITEMS`
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// How long a rendered feed is served from cache, in seconds
    #[serde(default = "default_freshness")]
    pub freshness_secs: u64,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }
fn default_port_fallback_span() -> u16 { 10 }
fn default_navigation_timeout() -> u64 { 60 }
fn default_settle_delay() -> u64 { 5000 }
fn default_max_attempts() -> usize { 2 }
fn default_max_items() -> usize { crate::extract::MAX_ITEMS }
fn default_freshness() -> u64 { 600 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            port_fallback_span: default_port_fallback_span(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: default_navigation_timeout(),
            settle_delay_ms: default_settle_delay(),
            max_attempts: default_max_attempts(),
            max_items: default_max_items(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_secs: default_freshness(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to
    /// defaults when it is missing or invalid.
    pub fn load() -> Self {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            log::info!("No {} found, using default configuration", CONFIG_FILE);
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("{}. Using default configuration", e);
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

impl ScrapeConfig {
    pub fn settings(&self) -> ScrapeSettings {
        ScrapeSettings {
            navigation_timeout: Duration::from_secs(self.navigation_timeout_secs),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            max_attempts: self.max_attempts,
            max_items: self.max_items.min(crate::extract::MAX_ITEMS),
        }
    }
}

impl CacheConfig {
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }
}
