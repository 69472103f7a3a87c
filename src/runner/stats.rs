use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Immutable snapshot of one suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteStats {
    pub suite_name: String,
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
}

impl SuiteStats {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }

    pub fn fail_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed as f64 / self.total as f64 * 100.0
        }
    }

    pub fn skip_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.skipped as f64 / self.total as f64 * 100.0
        }
    }
}

/// Process-wide concurrent counters and suite timing.
///
/// `record*` calls may arrive concurrently from arbitrary worker threads;
/// increments are atomic so no update is ever lost and no call blocks on
/// another worker.
pub struct ResultAggregator {
    suite_name: Mutex<String>,
    started_at: Mutex<Option<DateTime<Utc>>>,
    total: AtomicU64,
    passed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self {
            suite_name: Mutex::new(String::new()),
            started_at: Mutex::new(None),
            total: AtomicU64::new(0),
            passed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    /// Reset all counters, record the suite name and start time.
    ///
    /// Must be called exactly once before any `record_*` call; calling it
    /// again resets in-flight counts.
    pub fn start_suite(&self, name: &str) {
        *self.suite_name.lock().unwrap() = name.to_string();
        *self.started_at.lock().unwrap() = Some(Utc::now());
        self.total.store(0, Ordering::SeqCst);
        self.passed.store(0, Ordering::SeqCst);
        self.failed.store(0, Ordering::SeqCst);
        self.skipped.store(0, Ordering::SeqCst);
    }

    /// Increments total, independent of the eventual outcome call.
    pub fn record_test_started(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_pass(&self) {
        self.passed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_fail(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    /// Capture the end time and return an immutable snapshot.
    ///
    /// The runner must have joined all workers first; at that point the
    /// suite is drained and `passed + failed + skipped == total`. A
    /// mismatch here means an aggregation bug, not a normal error path.
    pub fn finish_suite(&self) -> SuiteStats {
        let finished_at = Utc::now();
        let started_at = *self.started_at.lock().unwrap();
        let stats = SuiteStats {
            suite_name: self.suite_name.lock().unwrap().clone(),
            total: self.total.load(Ordering::SeqCst),
            passed: self.passed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
            started_at,
            finished_at: Some(finished_at),
            duration_ms: started_at
                .map(|start| (finished_at - start).num_milliseconds().max(0) as u64),
        };

        let recorded = stats.passed + stats.failed + stats.skipped;
        if recorded != stats.total {
            log::error!(
                "suite counters inconsistent after drain: total={} recorded={}",
                stats.total,
                recorded
            );
            debug_assert_eq!(recorded, stats.total);
        }

        stats
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}
