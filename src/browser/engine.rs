//! Render-engine abstraction.
//!
//! The lifecycle manager and the scrape orchestrator only talk to these
//! traits. `chrome.rs` implements them on top of `headless_chrome`; tests
//! implement them with scripted fakes.

use super::config::BrowserConfig;
use std::fmt;
use std::time::Duration;

/// What went wrong in the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderErrorKind {
    /// Navigation or a wait exceeded its bound
    Timeout,
    /// The browser process, its connection, or the page target died
    Crashed,
    /// The browser process could not be started
    Launch,
    /// Anything else reported by the browser
    Other,
}

impl fmt::Display for RenderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderErrorKind::Timeout => "timeout",
            RenderErrorKind::Crashed => "crashed",
            RenderErrorKind::Launch => "launch",
            RenderErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Error produced by a render-engine adapter, already classified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RenderError {
    pub kind: RenderErrorKind,
    pub message: String,
}

impl RenderError {
    pub fn new(kind: RenderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(RenderErrorKind::Timeout, message)
    }

    pub fn crashed(message: impl Into<String>) -> Self {
        Self::new(RenderErrorKind::Crashed, message)
    }

    pub fn launch(message: impl Into<String>) -> Self {
        Self::new(RenderErrorKind::Launch, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(RenderErrorKind::Other, message)
    }

    /// Build an error from a browser failure `cause`, prefixed with `context`.
    ///
    /// The kind is inferred from `cause` alone; `context` may carry
    /// caller-supplied text such as the page URL.
    pub fn classified(context: impl fmt::Display, cause: &str) -> Self {
        Self::new(classify_message(cause), format!("{}: {}", context, cause))
    }

    pub fn is_crash(&self) -> bool {
        self.kind == RenderErrorKind::Crashed
    }
}

const CRASH_MARKERS: &[&str] = &[
    "target closed",
    "browser has been closed",
    "connection closed",
    "connection is closed",
    "no such process",
    "session closed",
    "no session with given id",
    "target crashed",
    "trying to work with closed connection",
];

const TIMEOUT_MARKERS: &[&str] = &["timed out", "timeout", "never came"];

/// Map raw browser error text onto a kind.
///
/// Only adapters whose binding reports untyped errors should need this.
pub fn classify_message(message: &str) -> RenderErrorKind {
    let lower = message.to_lowercase();
    if CRASH_MARKERS.iter().any(|m| lower.contains(m)) {
        RenderErrorKind::Crashed
    } else if TIMEOUT_MARKERS.iter().any(|m| lower.contains(m)) {
        RenderErrorKind::Timeout
    } else {
        RenderErrorKind::Other
    }
}

/// One live browser process.
pub trait RenderEngine: Send {
    /// Cheap liveness probe; `false` means the handle must be replaced.
    fn is_alive(&self) -> bool;

    /// Open a fresh, isolated page.
    fn open_page(&self) -> Result<Box<dyn PageSession>, RenderError>;

    /// Terminate the process.
    fn shutdown(self: Box<Self>) -> Result<(), RenderError>;
}

/// A single page (tab) inside a [`RenderEngine`].
pub trait PageSession {
    /// Navigate and wait for the document to load, bounded by `timeout`.
    fn navigate(&self, url: &str, timeout: Duration) -> Result<(), RenderError>;

    /// Serialized DOM of the current document.
    fn content(&self) -> Result<String, RenderError>;

    fn close(&self) -> Result<(), RenderError>;
}

/// Starts browser processes.
pub trait EngineLauncher: Send + Sync {
    fn launch(&self, config: &BrowserConfig) -> Result<Box<dyn RenderEngine>, RenderError>;
}
