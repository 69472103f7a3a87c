use super::types::SuiteReport;
use crate::error::{HarnessError, Result};

/// Render the report model as pretty-printed JSON.
pub fn render(model: &SuiteReport) -> Result<String> {
    serde_json::to_string_pretty(model)
        .map_err(|e| HarnessError::Report(std::io::Error::new(std::io::ErrorKind::Other, e)))
}
