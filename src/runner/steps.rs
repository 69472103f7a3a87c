use crate::capture::ScreenshotCapture;
use crate::session::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use std::time::Instant;

/// Status of one logged step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Info,
    Pass,
    Fail,
    Warning,
}

/// One logged, timestamped event within a single test's execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// 1-based, strictly increasing within the owning test.
    pub index: u32,
    pub status: StepStatus,
    pub message: String,
    pub screenshot: Option<String>,
    pub timestamp: DateTime<Utc>,
}

struct StepSlot {
    counter: u32,
    records: Vec<StepRecord>,
    started: Instant,
}

impl StepSlot {
    fn new() -> Self {
        Self {
            counter: 0,
            records: Vec::new(),
            started: Instant::now(),
        }
    }
}

/// Step sequence and wall duration of one finished test.
pub struct FinishedSteps {
    pub records: Vec<StepRecord>,
    pub duration_ms: u64,
}

/// Per-test, thread-isolated ordered log of step events.
///
/// Each worker thread gets its own slot and counter; concurrent logging on
/// different threads never interleaves or shares a counter. Logging never
/// raises.
pub struct StepLogger {
    slots: Mutex<HashMap<ThreadId, StepSlot>>,
}

impl StepLogger {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Bind a fresh, empty step sequence to the calling thread.
    pub fn start_test(&self) {
        let thread = std::thread::current().id();
        self.slots.lock().unwrap().insert(thread, StepSlot::new());
    }

    fn append(&self, status: StepStatus, message: &str, screenshot: Option<String>) {
        let thread = std::thread::current().id();
        let mut slots = self.slots.lock().unwrap();
        let slot = slots.entry(thread).or_insert_with(StepSlot::new);
        slot.counter += 1;

        match status {
            StepStatus::Info => log::info!("Step {}: {}", slot.counter, message),
            StepStatus::Pass => log::info!("✓ Step {}: {}", slot.counter, message),
            StepStatus::Fail => log::error!("✗ Step {}: {}", slot.counter, message),
            StepStatus::Warning => log::warn!("⚠ Step {}: {}", slot.counter, message),
        }

        slot.records.push(StepRecord {
            index: slot.counter,
            status,
            message: message.to_string(),
            screenshot,
            timestamp: Utc::now(),
        });
    }

    pub fn log_step(&self, message: &str) {
        self.append(StepStatus::Info, message, None);
    }

    pub fn log_pass(&self, message: &str) {
        self.append(StepStatus::Pass, message, None);
    }

    pub fn log_fail(&self, message: &str) {
        self.append(StepStatus::Fail, message, None);
    }

    pub fn log_warning(&self, message: &str) {
        self.append(StepStatus::Warning, message, None);
    }

    /// Append a step with a screenshot attached.
    ///
    /// A capture failure degrades to a plain log entry; the reference is
    /// simply omitted.
    pub fn log_with_screenshot(
        &self,
        status: StepStatus,
        message: &str,
        capture: &ScreenshotCapture,
        session: &Arc<Mutex<Session>>,
        label: &str,
    ) {
        let screenshot = capture.capture(session, label);
        self.append(status, message, screenshot);
    }

    /// Current step number for the calling thread (0 before any step).
    pub fn current_step(&self) -> u32 {
        let thread = std::thread::current().id();
        self.slots
            .lock()
            .unwrap()
            .get(&thread)
            .map(|slot| slot.counter)
            .unwrap_or(0)
    }

    /// Return the accumulated sequence and clear the thread-local state.
    pub fn end_test(&self) -> FinishedSteps {
        let thread = std::thread::current().id();
        let slot = self
            .slots
            .lock()
            .unwrap()
            .remove(&thread)
            .unwrap_or_else(StepSlot::new);
        FinishedSteps {
            records: slot.records,
            duration_ms: slot.started.elapsed().as_millis() as u64,
        }
    }
}

impl Default for StepLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn indices_start_at_one_and_increase_by_one() {
        let logger = StepLogger::new();
        logger.start_test();
        logger.log_step("open login page");
        logger.log_pass("credentials accepted");
        logger.log_warning("slow response");

        let finished = logger.end_test();
        let indices: Vec<u32> = finished.records.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(finished.records[1].status, StepStatus::Pass);
    }

    #[test]
    fn start_test_resets_the_counter() {
        let logger = StepLogger::new();
        logger.start_test();
        logger.log_step("first test");
        logger.log_step("first test again");
        assert_eq!(logger.current_step(), 2);

        logger.start_test();
        assert_eq!(logger.current_step(), 0);
        logger.log_step("second test");
        let finished = logger.end_test();
        assert_eq!(finished.records.len(), 1);
        assert_eq!(finished.records[0].index, 1);
    }

    #[test]
    fn end_test_clears_state() {
        let logger = StepLogger::new();
        logger.start_test();
        logger.log_step("only step");
        let _ = logger.end_test();
        assert_eq!(logger.current_step(), 0);
        assert!(logger.end_test().records.is_empty());
    }

    #[test]
    fn capture_failure_degrades_to_a_plain_entry() {
        use crate::capture::ScreenshotCapture;
        use crate::config::WaitPolicy;
        use crate::session::testutil::StubProvider;
        use crate::session::SessionManager;

        let dir = tempfile::tempdir().unwrap();
        let capture = ScreenshotCapture::new(dir.path());
        let manager = SessionManager::new(
            Arc::new(StubProvider::failing_screenshot()),
            "https://demo.example.com",
            WaitPolicy::default(),
        );
        let session = manager.acquire().unwrap();

        let logger = StepLogger::new();
        logger.start_test();
        logger.log_step("open page");
        logger.log_with_screenshot(
            StepStatus::Fail,
            "element not found",
            &capture,
            &session,
            "broken_flow_FAILED",
        );

        let finished = logger.end_test();
        assert_eq!(finished.records.len(), 2);
        let step = &finished.records[1];
        assert_eq!(step.index, 2);
        assert_eq!(step.status, StepStatus::Fail);
        assert_eq!(step.message, "element not found");
        assert!(step.screenshot.is_none());
        manager.release();
    }

    #[test]
    fn counters_are_isolated_across_threads() {
        let logger = Arc::new(StepLogger::new());
        logger.start_test();
        logger.log_step("main step 1");

        let mut handles = Vec::new();
        for worker in 0..4 {
            let logger = Arc::clone(&logger);
            handles.push(std::thread::spawn(move || {
                logger.start_test();
                for step in 0..50 {
                    logger.log_step(&format!("worker {} step {}", worker, step));
                }
                logger.end_test().records
            }));
        }
        for handle in handles {
            let records = handle.join().unwrap();
            assert_eq!(records.len(), 50);
            assert_eq!(records.first().unwrap().index, 1);
            assert_eq!(records.last().unwrap().index, 50);
        }

        // Concurrent logging elsewhere never touched this thread's counter.
        assert_eq!(logger.current_step(), 1);
    }
}
