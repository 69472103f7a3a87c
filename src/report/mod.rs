//! Report assembly and rendering.
//!
//! Worker threads append finished [`TestOutcome`]s concurrently; rendering
//! happens once, after the runner has joined all workers. The builder itself
//! provides no wait primitive.

pub mod html;
pub mod json;
pub mod types;

use crate::error::Result;
use crate::runner::stats::SuiteStats;
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use types::{SuiteReport, TestOutcome};

/// The rendered file summarizing a suite run.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub path: PathBuf,
}

impl ReportArtifact {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.html".to_string())
    }
}

/// Collects test outcomes and renders them into a single artifact.
pub struct ReportBuilder {
    outcomes: Mutex<Vec<TestOutcome>>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
        }
    }

    /// Append one finished test's data. May be called concurrently from
    /// different worker threads; append is the only mutation.
    pub fn record_outcome(&self, outcome: TestOutcome) {
        self.outcomes.lock().unwrap().push(outcome);
    }

    pub fn outcome_count(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }

    /// Snapshot the in-memory model for rendering.
    pub fn build_model(&self, stats: &SuiteStats) -> SuiteReport {
        SuiteReport {
            stats: stats.clone(),
            tests: self.outcomes.lock().unwrap().clone(),
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Render the self-contained HTML artifact at `path`.
    ///
    /// Re-rendering the same in-memory model produces byte-identical
    /// content; only `generated_at` varies between models.
    pub fn render(&self, stats: &SuiteStats, path: &Path) -> Result<ReportArtifact> {
        let model = self.build_model(stats);
        write_html(&model, path)?;
        Ok(ReportArtifact {
            path: path.to_path_buf(),
        })
    }

    /// Render the JSON sidecar of the same model.
    pub fn render_json(&self, stats: &SuiteStats, path: &Path) -> Result<()> {
        let model = self.build_model(stats);
        write_json(&model, path)
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write an already-built model as HTML.
pub fn write_html(model: &SuiteReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html::render(model))?;
    Ok(())
}

/// Write an already-built model as JSON.
pub fn write_json(model: &SuiteReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json::render(model)?)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::types::{TestOutcome, TestStatus};
    use crate::runner::stats::SuiteStats;
    use crate::runner::steps::{StepRecord, StepStatus};
    use chrono::{TimeZone, Utc};

    pub fn step(index: u32, status: StepStatus, message: &str) -> StepRecord {
        StepRecord {
            index,
            status,
            message: message.to_string(),
            screenshot: None,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    pub fn outcome(name: &str, status: TestStatus) -> TestOutcome {
        TestOutcome {
            name: name.to_string(),
            category: "LoginTest".to_string(),
            status,
            duration_ms: 1200,
            steps: vec![
                step(1, StepStatus::Info, "navigate to entry point"),
                step(2, StepStatus::Pass, "form submitted"),
            ],
            failure: match status {
                TestStatus::Failed => Some("assertion failed: title mismatch".to_string()),
                _ => None,
            },
        }
    }

    pub fn stats(total: u64, passed: u64, failed: u64, skipped: u64) -> SuiteStats {
        SuiteStats {
            suite_name: "Smoke Suite".to_string(),
            total,
            passed,
            failed,
            skipped,
            started_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            finished_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 5, 0).unwrap()),
            duration_ms: Some(300_000),
        }
    }
}
