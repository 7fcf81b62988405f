//! Headless browser lifecycle
//!
//! One Chrome process serves every request. [`BrowserManager`] launches it on
//! first use, probes it before each use, and replaces it when it dies. All
//! access goes through an [`EngineSession`], which holds the manager's lock.
//!
//! # Example
//!
//! ```no_run
//! use js_rss_feeds::browser::{BrowserConfig, BrowserManager};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = BrowserManager::new(BrowserConfig::default());
//!
//! let mut session = manager.lock();
//! let engine = session.acquire_live_engine()?;
//! let page = engine.open_page()?;
//! page.navigate("https://example.com", Duration::from_secs(60))?;
//! println!("Rendered {} bytes of HTML", page.content()?.len());
//! page.close()?;
//! drop(session);
//!
//! manager.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod chrome;
pub mod config;
pub mod engine;
pub mod manager;

// Re-export main types for convenience
pub use chrome::ChromeLauncher;
pub use config::BrowserConfig;
pub use engine::{EngineLauncher, PageSession, RenderEngine, RenderError, RenderErrorKind};
pub use manager::{BrowserManager, EngineSession};
