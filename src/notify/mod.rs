//! Suite summary notification over SMTP.
//!
//! Delivery is best-effort, fire-and-forget: by the time the summary is
//! sent the suite result is already final, so every transport or validation
//! failure is logged at this boundary and swallowed. Transport settings are
//! validated before any network attempt.

pub mod message;

use crate::config::MailSettings;
use crate::error::{HarnessError, Result};
use crate::runner::stats::SuiteStats;
use lettre::message::header::{ContentType, Header, HeaderName, HeaderValue};
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use message::{Body, NotificationMessage};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

/// Numeric priority header carried by the summary mail.
#[derive(Debug, Clone)]
struct XPriority(u8);

impl Header for XPriority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Priority")
    }

    fn parse(s: &str) -> std::result::Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.trim().parse()?))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.to_string())
    }
}

pub struct NotificationDispatcher {
    settings: MailSettings,
}

impl NotificationDispatcher {
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }

    /// Compose and send the suite summary, attaching the most recent report
    /// artifact found in `report_dir`.
    ///
    /// This is the fire-and-forget boundary: all errors are logged and
    /// swallowed; the suite's pass/fail status is never affected.
    pub fn dispatch_suite_report(&self, stats: &SuiteStats, report_dir: &Path) {
        let mut message = NotificationMessage::for_suite(
            stats,
            self.settings.report_url.as_deref(),
            &self.settings.from,
            &self.settings.recipients,
        );
        if let Some(report) = latest_report(report_dir) {
            message = message.with_attachment(report);
        } else {
            log::warn!(
                "no report artifact found under {}, sending summary without attachment",
                report_dir.display()
            );
        }

        match self.send(&message) {
            Ok(()) => log::info!(
                "suite summary sent to {} recipient(s)",
                self.settings.recipients.len()
            ),
            Err(e) => log::error!("failed to send suite summary: {}", e),
        }
    }

    /// Validate settings, open the SMTP session, and send synchronously.
    ///
    /// Validation errors surface before any network attempt. Connect, read,
    /// and write are bounded by the configured timeout so a dead relay
    /// cannot hang suite teardown.
    pub fn send(&self, message: &NotificationMessage) -> Result<()> {
        self.settings.validate()?;
        if message.to.is_empty() {
            return Err(HarnessError::Configuration(
                "notification recipients must not be empty".to_string(),
            ));
        }

        let email = self.build_email(message)?;
        let transport = self.build_transport()?;
        transport
            .send(&email)
            .map_err(|e| HarnessError::NotificationDelivery(e.to_string()))?;
        Ok(())
    }

    fn build_email(&self, message: &NotificationMessage) -> Result<Message> {
        let from: Mailbox = message.from.parse().map_err(|e| {
            HarnessError::Configuration(format!("invalid sender '{}': {}", message.from, e))
        })?;

        let mut builder = Message::builder()
            .from(from)
            .subject(message.subject.clone())
            .header(XPriority(message.priority.header_value()));
        for recipient in &message.to {
            let mailbox: Mailbox = recipient.parse().map_err(|e| {
                HarnessError::Configuration(format!("invalid recipient '{}': {}", recipient, e))
            })?;
            builder = builder.to(mailbox);
        }

        let body_part = match &message.body {
            Body::Html(html) => SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html.clone()),
            Body::Text(text) => SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(text.clone()),
        };

        let email = if message.attachments.is_empty() {
            builder.singlepart(body_part)
        } else {
            let mut multipart = MultiPart::mixed().singlepart(body_part);
            for path in &message.attachments {
                let bytes = match std::fs::read(path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        log::warn!("attachment {} not readable, skipping: {}", path.display(), e);
                        continue;
                    }
                };
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "attachment".to_string());
                let content_type = if file_name.ends_with(".html") {
                    ContentType::TEXT_HTML
                } else {
                    ContentType::parse("application/octet-stream").unwrap()
                };
                multipart = multipart.singlepart(Attachment::new(file_name).body(bytes, content_type));
            }
            builder.multipart(multipart)
        };

        email.map_err(|e| HarnessError::NotificationDelivery(e.to_string()))
    }

    fn build_transport(&self) -> Result<SmtpTransport> {
        let relay = if self.settings.use_ssl {
            SmtpTransport::relay(&self.settings.smtp_host)
        } else {
            SmtpTransport::starttls_relay(&self.settings.smtp_host)
        }
        .map_err(|e| HarnessError::NotificationDelivery(e.to_string()))?;

        Ok(relay
            .port(self.settings.smtp_port)
            .credentials(Credentials::new(
                self.settings.username.clone(),
                self.settings.password.clone(),
            ))
            .timeout(Some(Duration::from_millis(self.settings.timeout_ms)))
            .build())
    }
}

/// Most recent `.html` report in `dir`, by directory-listing order.
///
/// Listing order, not a verified modification-time comparison, decides
/// which file is "most recent".
pub fn latest_report(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map_or(false, |ext| ext == "html")
        })
        .last()
        .map(|entry| entry.into_path())
}

#[cfg(test)]
mod tests {
    use super::message::NotificationMessage;
    use super::*;
    use crate::config::MailSettings;
    use chrono::Utc;

    fn settings() -> MailSettings {
        MailSettings {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: "qa@example.com".to_string(),
            password: "secret".to_string(),
            from: "qa@example.com".to_string(),
            recipients: vec!["team@example.com".to_string()],
            use_starttls: true,
            use_ssl: false,
            timeout_ms: 10_000,
            report_url: None,
        }
    }

    fn stats() -> SuiteStats {
        SuiteStats {
            suite_name: "Smoke Suite".to_string(),
            total: 1,
            passed: 1,
            failed: 0,
            skipped: 0,
            started_at: Some(Utc::now()),
            finished_at: Some(Utc::now()),
            duration_ms: Some(1000),
        }
    }

    #[test]
    fn invalid_transport_config_fails_before_any_network_attempt() {
        let mut invalid = settings();
        invalid.use_ssl = true; // both modes set
        let dispatcher = NotificationDispatcher::new(invalid);
        let message =
            NotificationMessage::for_suite(&stats(), None, "qa@example.com", &["t@e.com".into()]);
        match dispatcher.send(&message) {
            Err(HarnessError::Configuration(msg)) => {
                assert!(msg.contains("mutually exclusive"));
            }
            other => panic!("expected Configuration error, got ok={}", other.is_ok()),
        }
    }

    #[test]
    fn empty_recipient_list_is_a_configuration_error() {
        let dispatcher = NotificationDispatcher::new(settings());
        let message = NotificationMessage::for_suite(&stats(), None, "qa@example.com", &[]);
        assert!(matches!(
            dispatcher.send(&message),
            Err(HarnessError::Configuration(_))
        ));
    }

    #[test]
    fn email_assembly_includes_attachment_parts() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("smoke-report.html");
        std::fs::write(&report, "<html></html>").unwrap();

        let dispatcher = NotificationDispatcher::new(settings());
        let message = NotificationMessage::for_suite(
            &stats(),
            None,
            "qa@example.com",
            &["team@example.com".to_string()],
        )
        .with_attachment(report);

        let email = dispatcher.build_email(&message).unwrap();
        let formatted = String::from_utf8(email.formatted()).unwrap();
        assert!(formatted.contains("X-Priority: 3"));
        assert!(formatted.contains("smoke-report.html"));
        assert!(formatted.contains("multipart/mixed"));
    }

    #[test]
    fn latest_report_picks_last_listing_entry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a-report.html"), "a").unwrap();
        std::fs::write(dir.path().join("b-report.html"), "b").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let picked = latest_report(dir.path()).unwrap();
        assert_eq!(picked.extension().unwrap(), "html");
    }

    #[test]
    fn latest_report_none_when_directory_empty_or_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(latest_report(dir.path()).is_none());
        assert!(latest_report(&dir.path().join("missing")).is_none());
    }
}
