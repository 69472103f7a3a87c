//! Thread-scoped session lifecycle management.
//!
//! Each worker thread owns at most one live [`Session`]. The manager keeps a
//! registry keyed by thread identity; `acquire` is idempotent within a
//! thread, `release` closes the driver and clears the slot, and
//! [`SessionScope`] guarantees release on both normal and exceptional test
//! completion.

pub mod provider;

use crate::config::WaitPolicy;
use crate::error::{HarnessError, Result};
use chrono::{DateTime, Utc};
use provider::{SessionDriver, SessionProvider};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use uuid::Uuid;

/// A thread-bound handle to a browser-automation driver.
pub struct Session {
    pub id: Uuid,
    pub owner: ThreadId,
    pub created_at: DateTime<Utc>,
    driver: Box<dyn SessionDriver>,
}

impl Session {
    pub fn screenshot(&mut self) -> anyhow::Result<Vec<u8>> {
        self.driver.screenshot()
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.driver.close()
    }
}

/// Registry of per-thread sessions with an acquire/release contract.
pub struct SessionManager {
    provider: Arc<dyn SessionProvider>,
    entry_url: String,
    waits: WaitPolicy,
    slots: Mutex<HashMap<ThreadId, Arc<Mutex<Session>>>>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn SessionProvider>, entry_url: &str, waits: WaitPolicy) -> Self {
        Self {
            provider,
            entry_url: entry_url.to_string(),
            waits,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the calling thread's session, creating one if none exists.
    ///
    /// Repeated calls without `release` return the identical instance.
    /// Creation failure is fatal for the calling test and is never retried
    /// silently.
    pub fn acquire(&self) -> Result<Arc<Mutex<Session>>> {
        let thread = std::thread::current().id();

        if let Some(session) = self.slots.lock().unwrap().get(&thread) {
            return Ok(Arc::clone(session));
        }

        // Driver startup may block on process/network I/O, so open outside
        // the registry lock. Only the owning thread inserts its own key, so
        // the slot cannot be created twice.
        let driver = self
            .provider
            .open(&self.entry_url, &self.waits)
            .map_err(|e| HarnessError::SessionCreation(e.to_string()))?;

        let session = Arc::new(Mutex::new(Session {
            id: Uuid::new_v4(),
            owner: thread,
            created_at: Utc::now(),
            driver,
        }));

        self.slots
            .lock()
            .unwrap()
            .insert(thread, Arc::clone(&session));
        Ok(session)
    }

    /// The calling thread's current session, without creating one.
    pub fn get(&self) -> Option<Arc<Mutex<Session>>> {
        let thread = std::thread::current().id();
        self.slots.lock().unwrap().get(&thread).cloned()
    }

    /// Close the calling thread's session and clear its slot.
    ///
    /// Safe to call when no session exists. A close failure never fails the
    /// test whose result is already determined; it is logged as a potential
    /// resource leak.
    pub fn release(&self) {
        let thread = std::thread::current().id();
        let slot = self.slots.lock().unwrap().remove(&thread);
        if let Some(session) = slot {
            // The lock is poisoned when the owning test panicked while
            // holding it; recover so the driver still gets closed.
            let mut session = session.lock().unwrap_or_else(|p| p.into_inner());
            if let Err(e) = session.close() {
                log::warn!(
                    "session {} close failed, driver may leak: {}",
                    session.id,
                    e
                );
            }
        }
    }

    /// Acquire with guaranteed release when the scope drops.
    pub fn scoped(&self) -> Result<SessionScope<'_>> {
        let session = self.acquire()?;
        Ok(SessionScope {
            manager: self,
            session,
        })
    }

    /// Number of live sessions across all threads.
    pub fn live_count(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    /// Close every remaining session, regardless of owning thread.
    ///
    /// Called after the runner has joined all workers; any slot still
    /// present at that point was leaked by its worker's cleanup.
    pub fn release_all(&self) {
        let leaked: Vec<_> = self.slots.lock().unwrap().drain().collect();
        for (thread, session) in leaked {
            let mut session = session.lock().unwrap_or_else(|p| p.into_inner());
            log::warn!(
                "session {} for thread {:?} was not released by its worker",
                session.id,
                thread
            );
            if let Err(e) = session.close() {
                log::warn!("leaked session {} close failed: {}", session.id, e);
            }
        }
    }
}

/// Guaranteed-cleanup scope around a thread's session.
pub struct SessionScope<'a> {
    manager: &'a SessionManager,
    session: Arc<Mutex<Session>>,
}

impl SessionScope<'_> {
    pub fn session(&self) -> &Arc<Mutex<Session>> {
        &self.session
    }
}

impl Drop for SessionScope<'_> {
    fn drop(&mut self) {
        self.manager.release();
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::provider::{SessionDriver, SessionProvider};
    use crate::config::WaitPolicy;
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Provider that hands out in-memory drivers and counts lifecycle calls.
    pub struct StubProvider {
        pub opened: AtomicUsize,
        pub closed: Arc<AtomicUsize>,
        pub fail_open: bool,
        pub fail_screenshot: bool,
    }

    impl StubProvider {
        pub fn new() -> Self {
            Self {
                opened: AtomicUsize::new(0),
                closed: Arc::new(AtomicUsize::new(0)),
                fail_open: false,
                fail_screenshot: false,
            }
        }

        pub fn failing_screenshot() -> Self {
            Self {
                fail_screenshot: true,
                ..Self::new()
            }
        }
    }

    pub struct StubDriver {
        closed: Arc<AtomicUsize>,
        fail_screenshot: bool,
    }

    impl SessionDriver for StubDriver {
        fn screenshot(&mut self) -> Result<Vec<u8>> {
            if self.fail_screenshot {
                anyhow::bail!("session disposed");
            }
            // Minimal PNG header, enough for a file round-trip.
            Ok(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])
        }

        fn close(&mut self) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl SessionProvider for StubProvider {
        fn open(&self, _entry_url: &str, _waits: &WaitPolicy) -> Result<Box<dyn SessionDriver>> {
            if self.fail_open {
                anyhow::bail!("driver unavailable");
            }
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubDriver {
                closed: Arc::clone(&self.closed),
                fail_screenshot: self.fail_screenshot,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::StubProvider;
    use super::*;
    use std::sync::atomic::Ordering;

    fn manager(provider: StubProvider) -> SessionManager {
        SessionManager::new(
            Arc::new(provider),
            "https://demo.example.com",
            WaitPolicy::default(),
        )
    }

    #[test]
    fn acquire_is_idempotent_within_a_thread() {
        let manager = manager(StubProvider::new());
        let first = manager.acquire().unwrap();
        let second = manager.acquire().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.live_count(), 1);
    }

    #[test]
    fn distinct_threads_get_distinct_sessions() {
        let manager = Arc::new(manager(StubProvider::new()));

        let main_session = manager.acquire().unwrap();
        let main_id = main_session.lock().unwrap().id;

        let worker = {
            let manager = Arc::clone(&manager);
            std::thread::spawn(move || {
                let session = manager.acquire().unwrap();
                let id = session.lock().unwrap().id;
                manager.release();
                id
            })
        };
        let worker_id = worker.join().unwrap();

        assert_ne!(main_id, worker_id);
        // Worker released its own slot; this thread's session survives.
        assert_eq!(manager.live_count(), 1);
        manager.release();
        assert_eq!(manager.live_count(), 0);
    }

    #[test]
    fn release_without_session_is_a_noop() {
        let manager = manager(StubProvider::new());
        manager.release();
        assert_eq!(manager.live_count(), 0);
    }

    #[test]
    fn creation_failure_propagates() {
        let provider = StubProvider {
            fail_open: true,
            ..StubProvider::new()
        };
        let manager = manager(provider);
        match manager.acquire() {
            Err(HarnessError::SessionCreation(_)) => {}
            Err(other) => panic!("expected SessionCreation error, got {other}"),
            Ok(_) => panic!("expected SessionCreation error, got a session"),
        }
        assert_eq!(manager.live_count(), 0);
    }

    #[test]
    fn scope_releases_on_drop() {
        let provider = StubProvider::new();
        let closed = Arc::clone(&provider.closed);
        let manager = manager(provider);
        {
            let scope = manager.scoped().unwrap();
            let _ = scope.session();
            assert_eq!(manager.live_count(), 1);
        }
        assert_eq!(manager.live_count(), 0);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_all_closes_sessions_with_a_poisoned_lock() {
        let provider = StubProvider::new();
        let closed = Arc::clone(&provider.closed);
        let manager = Arc::new(manager(provider));

        let poisoner = {
            let manager = Arc::clone(&manager);
            std::thread::spawn(move || {
                let session = manager.acquire().unwrap();
                let _guard = session.lock().unwrap();
                panic!("test logic died while holding its session");
            })
        };
        assert!(poisoner.join().is_err());

        assert_eq!(manager.live_count(), 1);
        manager.release_all();
        assert_eq!(manager.live_count(), 0);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_all_sweeps_leaked_sessions() {
        let provider = StubProvider::new();
        let closed = Arc::clone(&provider.closed);
        let manager = Arc::new(manager(provider));

        let worker = {
            let manager = Arc::clone(&manager);
            // Worker exits without releasing.
            std::thread::spawn(move || {
                manager.acquire().unwrap();
            })
        };
        worker.join().unwrap();

        assert_eq!(manager.live_count(), 1);
        manager.release_all();
        assert_eq!(manager.live_count(), 0);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }
}
