//! Scripted stand-in for Chrome, shared by the integration tests.
//!
//! Each navigation consumes the next [`Step`] from the script, so a test can
//! line up "crash, then render this HTML" without a real browser.
#![allow(dead_code)]

use js_rss_feeds::browser::{
    BrowserConfig, EngineLauncher, PageSession, RenderEngine, RenderError,
};
use js_rss_feeds::config::Config;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Step {
    /// Navigation succeeds and the page renders this HTML
    Html(String),
    /// The browser process dies during navigation
    Crash,
    /// Navigation exceeds its timeout
    Timeout,
    /// Any other navigation error
    Fail,
}

#[derive(Default)]
pub struct Script {
    steps: Mutex<VecDeque<Step>>,
    navigations: Mutex<Vec<String>>,
    pub launches: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub pages_opened: AtomicUsize,
    pub pages_closed: AtomicUsize,
    pub fail_launch: AtomicBool,
    /// Simulated work inside each navigation and launch, in milliseconds
    pub delay_ms: AtomicU64,
    in_navigation: AtomicUsize,
    in_launch: AtomicUsize,
    /// Most navigations ever seen in flight at once
    pub max_concurrent_navigations: AtomicUsize,
    /// Most launches ever seen in flight at once
    pub max_concurrent_launches: AtomicUsize,
    open_pages: AtomicUsize,
    /// Most pages ever open at once
    pub max_open_pages: AtomicUsize,
}

impl Script {
    pub fn push(&self, step: Step) {
        self.steps.lock().unwrap().push_back(step);
    }

    pub fn remaining(&self) -> usize {
        self.steps.lock().unwrap().len()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Option<Step> {
        self.steps.lock().unwrap().pop_front()
    }

    /// Run `f` while counted as in flight on `current`, recording the peak in `peak`.
    fn tracked<T>(&self, current: &AtomicUsize, peak: &AtomicUsize, f: impl FnOnce() -> T) -> T {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        let result = f();
        current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

pub struct ScriptedLauncher(Arc<Script>);

struct ScriptedEngine {
    alive: Arc<AtomicBool>,
    script: Arc<Script>,
}

struct ScriptedPage {
    alive: Arc<AtomicBool>,
    script: Arc<Script>,
    html: Mutex<Option<String>>,
}

impl EngineLauncher for ScriptedLauncher {
    fn launch(&self, _config: &BrowserConfig) -> Result<Box<dyn RenderEngine>, RenderError> {
        let script = &self.0;
        script.tracked(&script.in_launch, &script.max_concurrent_launches, || {
            if script.fail_launch.load(Ordering::SeqCst) {
                return Err(RenderError::launch("Could not auto detect a chrome executable"));
            }
            script.launches.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ScriptedEngine {
                alive: Arc::new(AtomicBool::new(true)),
                script: script.clone(),
            }) as Box<dyn RenderEngine>)
        })
    }
}

impl RenderEngine for ScriptedEngine {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn open_page(&self) -> Result<Box<dyn PageSession>, RenderError> {
        if !self.is_alive() {
            return Err(RenderError::crashed("connection is closed"));
        }
        self.script.pages_opened.fetch_add(1, Ordering::SeqCst);
        let open = self.script.open_pages.fetch_add(1, Ordering::SeqCst) + 1;
        self.script.max_open_pages.fetch_max(open, Ordering::SeqCst);
        Ok(Box::new(ScriptedPage {
            alive: self.alive.clone(),
            script: self.script.clone(),
            html: Mutex::new(None),
        }))
    }

    fn shutdown(self: Box<Self>) -> Result<(), RenderError> {
        self.script.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl PageSession for ScriptedPage {
    fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), RenderError> {
        let script = &self.script;
        script.tracked(&script.in_navigation, &script.max_concurrent_navigations, || {
            self.play_step(url)
        })
    }

    fn content(&self) -> Result<String, RenderError> {
        self.html
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RenderError::other("page was never loaded"))
    }

    fn close(&self) -> Result<(), RenderError> {
        self.script.pages_closed.fetch_add(1, Ordering::SeqCst);
        self.script.open_pages.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

impl ScriptedPage {
    fn play_step(&self, url: &str) -> Result<(), RenderError> {
        self.script.navigations.lock().unwrap().push(url.to_string());
        match self.script.next_step() {
            Some(Step::Html(html)) => {
                *self.html.lock().unwrap() = Some(html);
                Ok(())
            }
            Some(Step::Crash) => {
                self.alive.store(false, Ordering::SeqCst);
                Err(RenderError::crashed("Unable to make method calls because underlying connection is closed"))
            }
            Some(Step::Timeout) => Err(RenderError::timeout("The event waited for never came")),
            Some(Step::Fail) => Err(RenderError::other("net::ERR_NAME_NOT_RESOLVED")),
            None => Err(RenderError::other("no scripted step left")),
        }
    }
}

/// Launcher that plays `steps` in order, plus a handle for inspecting it.
pub fn scripted(steps: Vec<Step>) -> (Box<dyn EngineLauncher>, Arc<Script>) {
    let script = Arc::new(Script::default());
    for step in steps {
        script.push(step);
    }
    (Box::new(ScriptedLauncher(script.clone())), script)
}

/// Default configuration without the post-navigation wait
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.scrape.settle_delay_ms = 0;
    config.scrape.navigation_timeout_secs = 5;
    config
}

/// A rendered news listing with `count` story cards
pub fn story_page(count: usize) -> String {
    let cards: String = (1..=count)
        .map(|i| {
            format!(
                r#"<div class="story-card">
  <img src="/img/{i}.jpg">
  <h6><a href="/news/story-{i}">Story {i}</a></h6>
  <p class="summary">Summary of story {i}</p>
  <span class="date">15-03-2024</span>
</div>"#,
                i = i
            )
        })
        .collect();

    format!(
        "<html><head><title>News</title></head><body><main>{}</main></body></html>",
        cards
    )
}
