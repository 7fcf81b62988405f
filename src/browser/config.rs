use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Flags passed to every Chrome process we launch.
///
/// Tuned for containers and small VMs: no sandbox (often unavailable without
/// extra privileges), no GPU, and a single renderer process.
pub const HARDENED_FLAGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-gpu",
    "--single-process",
    "--no-zygote",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-blink-features=AutomationControlled",
];

/// Configuration for the headless browser process
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Browser window width
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Browser window height
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Custom user agent
    #[serde(default = "default_user_agent")]
    pub user_agent: Option<String>,

    /// Path to a Chrome/Chromium binary (auto-detected when unset)
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// How long Chrome keeps an idle DevTools connection open, in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Additional Chrome flags
    #[serde(default)]
    pub extra_flags: Vec<String>,
}

fn default_true() -> bool { true }
fn default_window_width() -> u32 { 1920 }
fn default_window_height() -> u32 { 1080 }
fn default_idle_timeout() -> u64 { 3600 }
fn default_user_agent() -> Option<String> {
    Some(
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
            .to_string(),
    )
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: default_user_agent(),
            chrome_path: None,
            idle_timeout_secs: default_idle_timeout(),
            extra_flags: vec![],
        }
    }
}

impl BrowserConfig {
    /// All flags for a launch: the hardened set, the user agent, then extras.
    /// Duplicates from `extra_flags` are dropped.
    pub fn launch_flags(&self) -> Vec<String> {
        let mut flags: Vec<String> = HARDENED_FLAGS.iter().map(|f| f.to_string()).collect();

        if let Some(ua) = &self.user_agent {
            flags.push(format!("--user-agent={}", ua));
        }

        for flag in &self.extra_flags {
            if !flags.contains(flag) {
                flags.push(flag.clone());
            }
        }

        flags
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}
