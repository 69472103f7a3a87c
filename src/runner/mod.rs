pub mod context;
pub mod events;
pub mod stats;
pub mod steps;

pub use context::SuiteContext;
pub use events::{ConsoleListener, SuiteEvent, SuiteListener};
pub use stats::{ResultAggregator, SuiteStats};
pub use steps::{StepLogger, StepRecord, StepStatus};
