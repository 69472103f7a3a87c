use crate::config::WaitPolicy;
use anyhow::Result;

/// Live driver handle behind a session.
///
/// Implementations wrap a local or remote browser-automation driver. The
/// handle is owned by exactly one worker thread; it is `Send` so the
/// registry can sweep leaked handles at suite teardown, but it is never
/// shared between running workers.
pub trait SessionDriver: Send {
    /// Snapshot of the current display as encoded image bytes.
    fn screenshot(&mut self) -> Result<Vec<u8>>;

    /// Close the underlying driver, releasing its process/connection.
    fn close(&mut self) -> Result<()>;
}

/// Session provider capability.
///
/// This is the only seam the core depends on for browser automation:
/// open a driver at the configured entry point with the given wait policy,
/// then screenshot/close through the returned handle.
pub trait SessionProvider: Send + Sync {
    fn open(&self, entry_url: &str, waits: &WaitPolicy) -> Result<Box<dyn SessionDriver>>;
}
