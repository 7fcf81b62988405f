use super::config::BrowserConfig;
use super::engine::{EngineLauncher, PageSession, RenderEngine, RenderError};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Launches real Chrome/Chromium processes through `headless_chrome`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeLauncher;

impl ChromeLauncher {
    /// Build Chrome launch options from our config.
    ///
    /// `flags` must outlive the returned options since they borrow from it.
    fn build_launch_options<'a>(
        config: &BrowserConfig,
        flags: &'a [String],
    ) -> Result<LaunchOptions<'a>, RenderError> {
        let args: Vec<&OsStr> = flags.iter().map(|f| OsStr::new(f.as_str())).collect();

        LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .window_size(Some((config.window_width, config.window_height)))
            .path(config.chrome_path.clone())
            .idle_browser_timeout(config.idle_timeout())
            .args(args)
            .build()
            .map_err(|e| RenderError::launch(format!("Invalid launch options: {}", e)))
    }
}

impl EngineLauncher for ChromeLauncher {
    fn launch(&self, config: &BrowserConfig) -> Result<Box<dyn RenderEngine>, RenderError> {
        let flags = config.launch_flags();
        let options = Self::build_launch_options(config, &flags)?;

        let browser = Browser::new(options)
            .map_err(|e| RenderError::launch(format!("Browser initialization failed: {:#}", e)))?;

        log::info!(
            "Chrome started (pid {:?}, headless: {})",
            browser.get_process_id(),
            config.headless
        );

        Ok(Box::new(ChromeEngine { browser }))
    }
}

/// A running Chrome process.
pub struct ChromeEngine {
    browser: Browser,
}

impl RenderEngine for ChromeEngine {
    fn is_alive(&self) -> bool {
        match self.browser.get_version() {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Chrome liveness probe failed: {:#}", e);
                false
            }
        }
    }

    fn open_page(&self) -> Result<Box<dyn PageSession>, RenderError> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| RenderError::classified("Tab creation failed", &format!("{:#}", e)))?;
        Ok(Box::new(ChromePage { tab }))
    }

    fn shutdown(self: Box<Self>) -> Result<(), RenderError> {
        let pid = self.browser.get_process_id();
        // Dropping the Browser kills the child process.
        drop(self.browser);
        log::debug!("Chrome process {:?} terminated", pid);
        Ok(())
    }
}

/// One tab in a [`ChromeEngine`].
pub struct ChromePage {
    tab: Arc<Tab>,
}

impl PageSession for ChromePage {
    fn navigate(&self, url: &str, timeout: Duration) -> Result<(), RenderError> {
        let started = Instant::now();
        self.tab.set_default_timeout(timeout);

        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| {
                let cause = format!("{:#}", e);
                let err = RenderError::classified(format_args!("Failed to load {}", url), &cause);
                if !err.is_crash() && started.elapsed() >= timeout {
                    RenderError::timeout(format!(
                        "Loading {} exceeded {}s",
                        url,
                        timeout.as_secs()
                    ))
                } else {
                    err
                }
            })?;

        Ok(())
    }

    fn content(&self) -> Result<String, RenderError> {
        self.tab
            .get_content()
            .map_err(|e| RenderError::classified("HTML extraction error", &format!("{:#}", e)))
    }

    fn close(&self) -> Result<(), RenderError> {
        self.tab
            .close(false)
            .map(|_| ())
            .map_err(|e| RenderError::classified("Failed to close tab", &format!("{:#}", e)))
    }
}
