pub mod capture;
pub mod config;
pub mod error;
pub mod notify;
pub mod report;
pub mod runner;
pub mod session;

// Re-export common items
pub use config::HarnessConfig;
pub use error::{HarnessError, Result};
pub use runner::{ConsoleListener, SuiteContext, SuiteEvent, SuiteListener};
pub use session::SessionManager;
