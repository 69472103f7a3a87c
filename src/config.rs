use crate::error::{HarnessError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Harness configuration, loaded once before the suite starts.
///
/// Missing required keys fail at load time, not during a test run.
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    /// Browser/session selection handed to the session provider.
    /// The `HARNESS_BROWSER` environment variable takes precedence.
    pub browser: String,

    /// Entry point the provider navigates to when a session is created.
    pub entry_url: String,

    #[serde(default)]
    pub waits: WaitPolicy,

    /// Directory for report artifacts, relative to the working directory.
    /// Screenshots always land under `screenshots/` next to it.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Capture a screenshot when a test passes (failures always capture).
    #[serde(default = "default_true")]
    pub screenshot_on_pass: bool,

    /// Transport settings for the suite summary email. Optional: a suite
    /// can run without notification, but when present the block must be
    /// complete and consistent.
    pub mail: Option<MailSettings>,
}

/// Implicit/explicit wait durations applied to every new session.
#[derive(Debug, Clone, Deserialize)]
pub struct WaitPolicy {
    #[serde(default = "default_implicit_wait")]
    pub implicit_wait_ms: u64,

    #[serde(default = "default_explicit_wait")]
    pub explicit_wait_ms: u64,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            implicit_wait_ms: default_implicit_wait(),
            explicit_wait_ms: default_explicit_wait(),
        }
    }
}

/// SMTP transport and recipient settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    pub username: String,
    pub password: String,

    /// Sender address.
    pub from: String,

    pub recipients: Vec<String>,

    /// STARTTLS on the submission port.
    #[serde(default = "default_true")]
    pub use_starttls: bool,

    /// Implicit TLS on the secure port. Mutually exclusive with STARTTLS.
    #[serde(default)]
    pub use_ssl: bool,

    /// Bound applied to connect/read/write so one failed send cannot hang
    /// suite teardown.
    #[serde(default = "default_mail_timeout")]
    pub timeout_ms: u64,

    /// Externally reachable copy of the report, linked from the email body.
    #[serde(default)]
    pub report_url: Option<String>,
}

impl MailSettings {
    /// Checked before any network attempt.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.smtp_host.trim().is_empty() {
            errors.push("mail.smtp_host is required");
        }
        if self.username.trim().is_empty() {
            errors.push("mail.username is required");
        }
        if self.password.trim().is_empty() {
            errors.push("mail.password is required");
        }
        if self.from.trim().is_empty() {
            errors.push("mail.from is required");
        }
        if self.recipients.is_empty() {
            errors.push("mail.recipients must not be empty");
        }
        if self.use_starttls && self.use_ssl {
            errors.push("mail: use_starttls and use_ssl are mutually exclusive");
        }
        if !self.use_starttls && !self.use_ssl {
            errors.push("mail: exactly one of use_starttls / use_ssl must be set");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::Configuration(errors.join("; ")))
        }
    }
}

impl HarnessConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut config: HarnessConfig = toml::from_str(&raw).map_err(|e| {
            HarnessError::Configuration(format!("cannot parse {}: {}", path.display(), e))
        })?;

        // Environment override beats the file-based default.
        if let Ok(browser) = std::env::var("HARNESS_BROWSER") {
            if !browser.trim().is_empty() {
                config.browser = browser;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.browser.trim().is_empty() {
            errors.push("browser is required".to_string());
        }
        if self.entry_url.trim().is_empty() {
            errors.push("entry_url is required".to_string());
        }
        if let Some(mail) = &self.mail {
            if let Err(HarnessError::Configuration(msg)) = mail.validate() {
                errors.push(msg);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::Configuration(errors.join("; ")))
        }
    }
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_implicit_wait() -> u64 {
    10_000
}

fn default_explicit_wait() -> u64 {
    20_000
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_timeout() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}
