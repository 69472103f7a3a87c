use crate::runner::stats::SuiteStats;
use crate::runner::steps::StepRecord;
use serde::{Deserialize, Serialize};

/// Final status of one test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// The finalized result of one test case. Immutable once submitted to the
/// report builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub name: String,
    /// Test class / category the case belongs to.
    pub category: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub steps: Vec<StepRecord>,
    pub failure: Option<String>,
}

/// In-memory report model for one suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    pub stats: SuiteStats,
    pub tests: Vec<TestOutcome>,
    pub generated_at: String,
}
