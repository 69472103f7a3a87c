use thiserror::Error;

/// Harness error taxonomy
///
/// Errors local to a single test (session creation) surface to that test's
/// result and stop only that test. Infrastructure errors (screenshot,
/// notification) are isolated at their own boundary and never reach the
/// pass/fail signal of a test or the suite.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Invalid or missing required settings. Fatal, surfaced before the
    /// suite starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Driver/session failed to initialize. Fatal for the affected test
    /// only; other workers are unaffected.
    #[error("failed to create session: {0}")]
    SessionCreation(String),

    /// Recoverable; callers receive a "none" result instead of this error.
    #[error("screenshot capture failed: {0}")]
    ScreenshotCapture(String),

    /// Recoverable; logged at the dispatch boundary, suite result unaffected.
    #[error("notification delivery failed: {0}")]
    NotificationDelivery(String),

    #[error("report generation failed: {0}")]
    Report(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
