use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use suite_harness::config::HarnessConfig;
use suite_harness::notify::NotificationDispatcher;
use suite_harness::report;

#[derive(Parser)]
#[command(name = "suite-harness")]
#[command(version = "0.1.0")]
#[command(about = "Concurrent UI test suite harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a harness configuration file
    Check {
        /// Path to the TOML configuration
        config: PathBuf,
    },

    /// Re-render a report artifact from saved suite results
    Report {
        /// Path to suite results JSON
        results: PathBuf,

        /// Output format (html, json)
        #[arg(short, long, default_value = "html")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Send the suite summary email for saved results
    Notify {
        /// Path to the TOML configuration
        config: PathBuf,

        /// Path to suite results JSON
        results: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => {
            let loaded = HarnessConfig::load(&config)?;
            println!("{} {} is valid", "✓".green().bold(), config.display());
            println!("  Browser: {}", loaded.browser.cyan());
            println!("  Entry URL: {}", loaded.entry_url.cyan());
            println!(
                "  Notification: {}",
                if loaded.mail.is_some() {
                    "configured".green()
                } else {
                    "disabled".yellow()
                }
            );
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            let model = load_results(&results)?;
            match format.as_str() {
                "html" => {
                    let path = output.unwrap_or_else(|| results.with_extension("html"));
                    report::write_html(&model, &path)?;
                    println!("{} Report written to {}", "📊".blue(), path.display());
                }
                "json" => {
                    let path = output.unwrap_or_else(|| results.with_extension("out.json"));
                    report::write_json(&model, &path)?;
                    println!("{} Report written to {}", "📊".blue(), path.display());
                }
                _ => anyhow::bail!("Unknown format: {}", format),
            }
        }

        Commands::Notify { config, results } => {
            let loaded = HarnessConfig::load(&config)?;
            let mail = loaded.mail.ok_or_else(|| {
                anyhow::anyhow!("no [mail] section in {}", config.display())
            })?;
            let model = load_results(&results)?;
            let report_dir = results.parent().unwrap_or_else(|| Path::new("."));

            println!(
                "{} Sending summary for suite {} to {} recipient(s)...",
                "✉".blue(),
                model.stats.suite_name.cyan(),
                mail.recipients.len()
            );
            NotificationDispatcher::new(mail).dispatch_suite_report(&model.stats, report_dir);
        }
    }

    Ok(())
}

fn load_results(path: &Path) -> anyhow::Result<report::types::SuiteReport> {
    let raw = std::fs::read_to_string(path)?;
    let model = serde_json::from_str(&raw)?;
    Ok(model)
}
