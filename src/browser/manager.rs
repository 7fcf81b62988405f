use super::chrome::ChromeLauncher;
use super::config::BrowserConfig;
use super::engine::{EngineLauncher, RenderEngine, RenderError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

type EngineSlot = Option<Box<dyn RenderEngine>>;

/// Owns the single browser process for the whole application.
///
/// The process is started lazily on first use and replaced whenever it is
/// found dead. Every read or write of the handle goes through [`EngineSession`],
/// which holds the manager's lock, so at most one (re)launch runs at a time.
pub struct BrowserManager {
    launcher: Box<dyn EngineLauncher>,
    config: BrowserConfig,
    engine: Mutex<EngineSlot>,
    launches: AtomicU64,
    relaunches: AtomicU64,
}

impl BrowserManager {
    /// Create a manager backed by real Chrome.
    pub fn new(config: BrowserConfig) -> Self {
        Self::with_launcher(config, Box::new(ChromeLauncher))
    }

    /// Create a manager with a custom launcher.
    pub fn with_launcher(config: BrowserConfig, launcher: Box<dyn EngineLauncher>) -> Self {
        Self {
            launcher,
            config,
            engine: Mutex::new(None),
            launches: AtomicU64::new(0),
            relaunches: AtomicU64::new(0),
        }
    }

    /// Take the lifecycle lock. Blocks while another caller holds it.
    pub fn lock(&self) -> EngineSession<'_> {
        EngineSession {
            manager: self,
            slot: self.engine.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Terminate the browser if one is running. Safe to call repeatedly.
    pub fn shutdown(&self) {
        let mut session = self.lock();
        if session.teardown() {
            log::info!("Browser shut down");
        }
    }

    /// Number of browser processes started so far
    pub fn launch_count(&self) -> u64 {
        self.launches.load(Ordering::Relaxed)
    }

    /// Number of launches that replaced an existing (dead or crashed) process
    pub fn relaunch_count(&self) -> u64 {
        self.relaunches.load(Ordering::Relaxed)
    }

    /// Whether a handle is currently held, or `None` if the lock is busy.
    pub fn is_running(&self) -> Option<bool> {
        match self.engine.try_lock() {
            Ok(slot) => Some(slot.is_some()),
            Err(std::sync::TryLockError::Poisoned(p)) => Some(p.into_inner().is_some()),
            Err(std::sync::TryLockError::WouldBlock) => None,
        }
    }

    /// Get the browser configuration
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }
}

/// Exclusive access to the browser handle for as long as it is held.
pub struct EngineSession<'a> {
    manager: &'a BrowserManager,
    slot: MutexGuard<'a, EngineSlot>,
}

impl<'a> EngineSession<'a> {
    /// Return the current engine if it answers a liveness probe, otherwise
    /// relaunch first. Never hands out an engine known to be dead.
    pub fn acquire_live_engine(&mut self) -> Result<&dyn RenderEngine, RenderError> {
        let alive = match self.slot.as_deref() {
            Some(engine) => {
                let alive = engine.is_alive();
                if !alive {
                    log::warn!("Browser failed liveness probe, relaunching");
                }
                alive
            }
            None => false,
        };

        if !alive {
            self.force_relaunch()?;
        }

        self.slot
            .as_deref()
            .ok_or_else(|| RenderError::launch("Browser handle missing after launch"))
    }

    /// Tear down whatever is running (ignoring errors) and start a new process.
    pub fn force_relaunch(&mut self) -> Result<(), RenderError> {
        if self.teardown() {
            self.manager.relaunches.fetch_add(1, Ordering::Relaxed);
        }

        log::info!("Launching headless browser...");
        let engine = self.manager.launcher.launch(&self.manager.config)?;
        self.manager.launches.fetch_add(1, Ordering::Relaxed);
        *self.slot = Some(engine);
        Ok(())
    }

    /// Drop the current handle. Returns whether there was one.
    fn teardown(&mut self) -> bool {
        match self.slot.take() {
            Some(engine) => {
                if let Err(e) = engine.shutdown() {
                    log::debug!("Ignoring error while tearing down browser: {}", e);
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::engine::PageSession;
    use crate::browser::RenderErrorKind;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct Shared {
        alive_flags: Mutex<Vec<Arc<AtomicBool>>>,
        shutdowns: AtomicUsize,
        fail_launch: AtomicBool,
        fail_shutdown: AtomicBool,
    }

    impl Shared {
        fn launched(&self) -> usize {
            self.alive_flags.lock().unwrap().len()
        }

        fn kill_latest(&self) {
            if let Some(flag) = self.alive_flags.lock().unwrap().last() {
                flag.store(false, Ordering::SeqCst);
            }
        }
    }

    struct FakeLauncher(Arc<Shared>);

    struct FakeEngine {
        alive: Arc<AtomicBool>,
        shared: Arc<Shared>,
    }

    struct NoopPage;

    impl PageSession for NoopPage {
        fn navigate(&self, _url: &str, _timeout: Duration) -> Result<(), RenderError> {
            Ok(())
        }
        fn content(&self) -> Result<String, RenderError> {
            Ok(String::new())
        }
        fn close(&self) -> Result<(), RenderError> {
            Ok(())
        }
    }

    impl EngineLauncher for FakeLauncher {
        fn launch(&self, _config: &BrowserConfig) -> Result<Box<dyn RenderEngine>, RenderError> {
            if self.0.fail_launch.load(Ordering::SeqCst) {
                return Err(RenderError::launch("chrome not found"));
            }
            let alive = Arc::new(AtomicBool::new(true));
            self.0.alive_flags.lock().unwrap().push(alive.clone());
            Ok(Box::new(FakeEngine {
                alive,
                shared: self.0.clone(),
            }))
        }
    }

    impl RenderEngine for FakeEngine {
        fn is_alive(&self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }
        fn open_page(&self) -> Result<Box<dyn PageSession>, RenderError> {
            Ok(Box::new(NoopPage))
        }
        fn shutdown(self: Box<Self>) -> Result<(), RenderError> {
            self.shared.shutdowns.fetch_add(1, Ordering::SeqCst);
            if self.shared.fail_shutdown.load(Ordering::SeqCst) {
                Err(RenderError::other("kill failed"))
            } else {
                Ok(())
            }
        }
    }

    fn manager() -> (BrowserManager, Arc<Shared>) {
        let shared = Arc::new(Shared::default());
        let manager = BrowserManager::with_launcher(
            BrowserConfig::default(),
            Box::new(FakeLauncher(shared.clone())),
        );
        (manager, shared)
    }

    #[test]
    fn test_lazy_launch_and_reuse() {
        let (manager, shared) = manager();
        assert_eq!(manager.is_running(), Some(false));
        assert_eq!(shared.launched(), 0);

        let mut session = manager.lock();
        assert!(session.acquire_live_engine().unwrap().is_alive());
        assert!(session.acquire_live_engine().is_ok());
        drop(session);

        assert_eq!(shared.launched(), 1);
        assert_eq!(manager.launch_count(), 1);
        assert_eq!(manager.relaunch_count(), 0);
        assert_eq!(manager.is_running(), Some(true));
    }

    #[test]
    fn test_dead_engine_is_replaced() {
        let (manager, shared) = manager();
        let mut session = manager.lock();
        session.acquire_live_engine().unwrap();

        shared.kill_latest();

        assert!(session.acquire_live_engine().unwrap().is_alive());
        drop(session);
        assert_eq!(shared.launched(), 2);
        assert_eq!(shared.shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(manager.relaunch_count(), 1);
    }

    #[test]
    fn test_force_relaunch_without_handle() {
        let (manager, _shared) = manager();
        manager.lock().force_relaunch().unwrap();
        assert_eq!(manager.launch_count(), 1);
        assert_eq!(manager.relaunch_count(), 0);
    }

    #[test]
    fn test_teardown_errors_are_swallowed() {
        let (manager, shared) = manager();
        shared.fail_shutdown.store(true, Ordering::SeqCst);

        let mut session = manager.lock();
        session.acquire_live_engine().unwrap();
        assert!(session.force_relaunch().is_ok());
        drop(session);

        assert_eq!(shared.launched(), 2);
        assert_eq!(manager.relaunch_count(), 1);
    }

    #[test]
    fn test_launch_failure_propagates() {
        let (manager, shared) = manager();
        shared.fail_launch.store(true, Ordering::SeqCst);

        let mut session = manager.lock();
        let err = session.acquire_live_engine().err().unwrap();
        assert_eq!(err.kind, RenderErrorKind::Launch);
        drop(session);
        assert_eq!(manager.is_running(), Some(false));
        assert_eq!(manager.launch_count(), 0);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (manager, shared) = manager();
        manager.lock().acquire_live_engine().unwrap();

        manager.shutdown();
        manager.shutdown();

        assert_eq!(shared.shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(manager.is_running(), Some(false));
    }
}
