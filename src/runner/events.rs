use super::stats::SuiteStats;
use colored::Colorize;

/// Lifecycle events emitted by the suite context.
///
/// The set is closed: listeners match on this enum and the harness never
/// emits anything outside it.
#[derive(Debug, Clone)]
pub enum SuiteEvent {
    SuiteStarted {
        name: String,
    },
    SuiteFinished {
        stats: SuiteStats,
    },
    TestStarted {
        name: String,
        category: String,
    },
    TestPassed {
        name: String,
    },
    TestFailed {
        name: String,
        error: String,
    },
    TestSkipped {
        name: String,
    },
}

/// Observer hooked into the suite lifecycle.
///
/// Listeners are invoked synchronously on the thread that produced the
/// event, in registration order. Implementations must be cheap or hand
/// off to their own thread.
pub trait SuiteListener: Send + Sync {
    fn on_event(&self, event: &SuiteEvent);
}

/// Default listener printing colored progress to stdout.
pub struct ConsoleListener;

impl SuiteListener for ConsoleListener {
    fn on_event(&self, event: &SuiteEvent) {
        match event {
            SuiteEvent::SuiteStarted { name } => {
                println!("\n{} Suite started: {}", "▶".green().bold(), name.cyan());
            }
            SuiteEvent::SuiteFinished { stats } => {
                println!("\n{} Suite finished: {}", "■".blue().bold(), stats.suite_name);
                println!(
                    "  {} passed, {} failed, {} skipped ({} total)",
                    stats.passed.to_string().green(),
                    stats.failed.to_string().red(),
                    stats.skipped.to_string().yellow(),
                    stats.total
                );
                if let Some(duration) = stats.duration_ms {
                    println!("  Duration: {}ms", duration);
                }
            }
            SuiteEvent::TestStarted { name, category } => {
                println!("  {} {} [{}]", "→".blue(), name.white().bold(), category.dimmed());
            }
            SuiteEvent::TestPassed { name } => {
                println!("  {} {}", "✓".green(), name);
            }
            SuiteEvent::TestFailed { name, error } => {
                println!("  {} {}: {}", "✗".red(), name, error.red());
            }
            SuiteEvent::TestSkipped { name } => {
                println!("  {} {} {}", "○".yellow(), name, "(skipped)".dimmed());
            }
        }
    }
}
