//! Shared suite context wiring sessions, counters, steps, screenshots,
//! reporting, and notification behind a single set of lifecycle hooks.
//!
//! One context instance serves the whole run; worker threads call the
//! `on_test_*` hooks for their own tests while the runner thread brackets
//! the run with `on_suite_start` / `on_suite_finish`.

use super::events::{SuiteEvent, SuiteListener};
use super::stats::{ResultAggregator, SuiteStats};
use super::steps::{StepLogger, StepStatus};
use crate::capture::ScreenshotCapture;
use crate::config::HarnessConfig;
use crate::error::Result;
use crate::notify::NotificationDispatcher;
use crate::report::types::{TestOutcome, TestStatus};
use crate::report::{ReportArtifact, ReportBuilder};
use crate::session::provider::SessionProvider;
use crate::session::{Session, SessionManager};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

struct ActiveTest {
    name: String,
    category: String,
}

/// The run-wide context handed to every worker thread.
pub struct SuiteContext {
    config: HarnessConfig,
    workdir: PathBuf,
    sessions: SessionManager,
    aggregator: ResultAggregator,
    steps: StepLogger,
    capture: ScreenshotCapture,
    reports: ReportBuilder,
    dispatcher: Option<NotificationDispatcher>,
    listeners: Vec<Box<dyn SuiteListener>>,
    active: Mutex<HashMap<ThreadId, ActiveTest>>,
}

impl SuiteContext {
    pub fn new(config: HarnessConfig, provider: Arc<dyn SessionProvider>, workdir: &Path) -> Self {
        let sessions = SessionManager::new(provider, &config.entry_url, config.waits.clone());
        let dispatcher = config.mail.clone().map(NotificationDispatcher::new);
        Self {
            sessions,
            dispatcher,
            workdir: workdir.to_path_buf(),
            aggregator: ResultAggregator::new(),
            steps: StepLogger::new(),
            capture: ScreenshotCapture::new(workdir),
            reports: ReportBuilder::new(),
            listeners: Vec::new(),
            active: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Register a lifecycle listener. Listeners fire in registration order,
    /// synchronously on the emitting thread.
    pub fn add_listener(&mut self, listener: Box<dyn SuiteListener>) {
        self.listeners.push(listener);
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn steps(&self) -> &StepLogger {
        &self.steps
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Directory report artifacts are written to.
    pub fn report_dir(&self) -> PathBuf {
        self.workdir.join(&self.config.report_dir)
    }

    fn emit(&self, event: SuiteEvent) {
        for listener in &self.listeners {
            listener.on_event(&event);
        }
    }

    pub fn on_suite_start(&self, name: &str) {
        self.aggregator.start_suite(name);
        self.emit(SuiteEvent::SuiteStarted {
            name: name.to_string(),
        });
    }

    /// Mark a test as started on the calling thread.
    ///
    /// Increments the total count immediately, so a test that later panics
    /// without reporting an outcome still shows up in the drain check.
    pub fn on_test_start(&self, name: &str, category: &str) {
        self.aggregator.record_test_started();
        self.steps.start_test();
        self.active.lock().unwrap().insert(
            std::thread::current().id(),
            ActiveTest {
                name: name.to_string(),
                category: category.to_string(),
            },
        );
        self.emit(SuiteEvent::TestStarted {
            name: name.to_string(),
            category: category.to_string(),
        });
    }

    /// The calling thread's session, created on first use.
    pub fn session(&self) -> Result<Arc<Mutex<Session>>> {
        self.sessions.acquire()
    }

    fn active_name(&self) -> String {
        self.active
            .lock()
            .unwrap()
            .get(&std::thread::current().id())
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "unnamed".to_string())
    }

    fn finish_outcome(&self, status: TestStatus, failure: Option<String>) -> String {
        let active = self
            .active
            .lock()
            .unwrap()
            .remove(&std::thread::current().id());
        let (name, category) = match active {
            Some(t) => (t.name, t.category),
            None => ("unnamed".to_string(), String::new()),
        };
        let finished = self.steps.end_test();
        self.reports.record_outcome(TestOutcome {
            name: name.clone(),
            category,
            status,
            duration_ms: finished.duration_ms,
            steps: finished.records,
            failure,
        });
        self.sessions.release();
        name
    }

    pub fn on_test_pass(&self) {
        let name = self.active_name();
        match self.sessions.get() {
            Some(session) if self.config.screenshot_on_pass => {
                self.steps.log_with_screenshot(
                    StepStatus::Pass,
                    "test passed",
                    &self.capture,
                    &session,
                    &format!("{}_PASSED", name),
                );
            }
            _ => self.steps.log_pass("test passed"),
        }
        self.aggregator.record_pass();
        let name = self.finish_outcome(TestStatus::Passed, None);
        self.emit(SuiteEvent::TestPassed { name });
    }

    /// Record a failure: a screenshot step is always attempted, then the
    /// error detail is logged as the final step.
    pub fn on_test_fail(&self, error: &str) {
        let name = self.active_name();
        match self.sessions.get() {
            Some(session) => {
                self.steps.log_with_screenshot(
                    StepStatus::Fail,
                    error,
                    &self.capture,
                    &session,
                    &format!("{}_FAILED", name),
                );
            }
            None => self.steps.log_fail(error),
        }
        self.aggregator.record_fail();
        let name = self.finish_outcome(TestStatus::Failed, Some(error.to_string()));
        self.emit(SuiteEvent::TestFailed {
            name,
            error: error.to_string(),
        });
    }

    pub fn on_test_skip(&self, reason: &str) {
        self.steps.log_warning(&format!("skipped: {}", reason));
        self.aggregator.record_skip();
        let name = self.finish_outcome(TestStatus::Skipped, None);
        self.emit(SuiteEvent::TestSkipped { name });
    }

    /// Finalize the run: sweep leaked sessions, snapshot counters, render
    /// the HTML report and its JSON sidecar, then notify stakeholders.
    ///
    /// Must be called after all worker threads have been joined.
    pub fn on_suite_finish(&self) -> Result<SuiteStats> {
        self.sessions.release_all();
        let stats = self.aggregator.finish_suite();

        let report_dir = self.report_dir();
        let slug = slugify(&stats.suite_name);
        let html_path = report_dir.join(format!("{}-report.html", slug));
        let artifact: ReportArtifact = self.reports.render(&stats, &html_path)?;
        self.reports
            .render_json(&stats, &html_path.with_extension("json"))?;
        log::info!("report written to {}", artifact.path.display());

        self.emit(SuiteEvent::SuiteFinished {
            stats: stats.clone(),
        });

        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.dispatch_suite_report(&stats, &report_dir);
        }

        Ok(stats)
    }
}

/// File-name slug for a suite name.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "suite".to_string()
    } else {
        slug
    }
}
