use crate::runner::stats::SuiteStats;
use chrono::Local;
use std::path::PathBuf;

/// Numeric mail priority, emitted as the `X-Priority` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Normal,
    Low,
}

impl Priority {
    pub fn header_value(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Normal => 3,
            Priority::Low => 5,
        }
    }
}

/// Message body: HTML or plain text, never both.
#[derive(Debug, Clone)]
pub enum Body {
    Html(String),
    Text(String),
}

/// The composed summary sent to stakeholders after a run.
///
/// Built fresh per suite completion; no lifecycle beyond the send call.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: Body,
    pub attachments: Vec<PathBuf>,
    pub priority: Priority,
}

impl NotificationMessage {
    /// Compose the suite summary message.
    ///
    /// Subject embeds the suite name and a timestamp; the body summarizes
    /// totals and rates; priority is high iff any test failed.
    pub fn for_suite(
        stats: &SuiteStats,
        report_url: Option<&str>,
        from: &str,
        to: &[String],
    ) -> Self {
        let subject = format!(
            "Test Execution Report - {} - {}",
            stats.suite_name,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let priority = if stats.has_failures() {
            Priority::High
        } else {
            Priority::Normal
        };
        Self {
            from: from.to_string(),
            to: to.to_vec(),
            subject,
            body: Body::Html(summary_html(stats, report_url)),
            attachments: Vec::new(),
            priority,
        }
    }

    pub fn with_attachment(mut self, path: PathBuf) -> Self {
        self.attachments.push(path);
        self
    }
}

/// Generated HTML summary: overall status, stat boxes, rates, and an
/// optional link to an externally reachable copy of the report.
fn summary_html(stats: &SuiteStats, report_url: Option<&str>) -> String {
    let (status_color, status_text, status_icon) = if stats.has_failures() {
        ("#ff4444", "FAILED", "❌")
    } else {
        ("#44aa44", "PASSED", "✅")
    };

    let duration = stats.duration_ms.unwrap_or(0);
    let minutes = duration / 60_000;
    let seconds = (duration % 60_000) / 1000;

    let rates = if stats.total > 0 {
        format!(
            "<li><strong>Pass Rate:</strong> {:.1}%</li>\
             <li><strong>Failure Rate:</strong> {:.1}%</li>\
             <li><strong>Skip Rate:</strong> {:.1}%</li>",
            stats.pass_rate(),
            stats.fail_rate(),
            stats.skip_rate()
        )
    } else {
        "<li><strong>No tests executed</strong></li>".to_string()
    };

    let link_section = match report_url {
        Some(url) => format!(
            "<div style='margin-top: 20px; padding: 15px; background-color: #e3f2fd; \
             border-left: 4px solid #2196f3; border-radius: 4px;'>\
             <h4 style='margin: 0 0 10px 0; color: #1976d2;'>📊 View Detailed Report Online</h4>\
             <a href='{url}' style='display: inline-block; padding: 10px 20px; \
             background-color: #2196f3; color: white; text-decoration: none; \
             border-radius: 4px; font-weight: bold;'>🔗 Open Report</a>\
             <p style='margin: 10px 0 0 0; font-size: 12px; color: #666;'>URL: {url}</p>\
             </div>",
            url = url
        ),
        None => String::new(),
    };

    format!(
        "<!DOCTYPE html>\
         <html><head><style>\
         body {{ font-family: Arial, sans-serif; margin: 20px; }}\
         .header {{ background-color: #f0f0f0; padding: 15px; border-radius: 5px; }}\
         .summary {{ background-color: #f9f9f9; padding: 15px; margin: 10px 0; border-radius: 5px; }}\
         .status {{ color: {status_color}; font-weight: bold; font-size: 18px; }}\
         .stats {{ display: flex; justify-content: space-around; margin: 20px 0; }}\
         .stat-box {{ text-align: center; padding: 15px; border: 1px solid #ddd; border-radius: 5px; margin: 5px; }}\
         .passed {{ background-color: #d4edda; }}\
         .failed {{ background-color: #f8d7da; }}\
         .skipped {{ background-color: #fff3cd; }}\
         .total {{ background-color: #e2e3e5; }}\
         </style></head><body>\
         <div class='header'>\
         <h1>{status_icon} Test Execution Report</h1>\
         <p><strong>Suite:</strong> {suite}</p>\
         <p><strong>Execution Time:</strong> {now}</p>\
         </div>\
         <div class='summary'>\
         <h2 class='status'>Overall Status: {status_text}</h2>\
         <p><strong>Execution Duration:</strong> {minutes} minutes {seconds} seconds</p>\
         </div>\
         <div class='stats'>\
         <div class='stat-box total'><h3>{total}</h3><p>Total Tests</p></div>\
         <div class='stat-box passed'><h3>{passed}</h3><p>Passed</p></div>\
         <div class='stat-box failed'><h3>{failed}</h3><p>Failed</p></div>\
         <div class='stat-box skipped'><h3>{skipped}</h3><p>Skipped</p></div>\
         </div>\
         <div class='summary'>\
         <h3>Test Summary</h3>\
         <ul>{rates}</ul>\
         <p><em>Detailed test report is attached to this email.</em></p>\
         {link_section}\
         </div>\
         </body></html>",
        status_color = status_color,
        status_icon = status_icon,
        suite = stats.suite_name,
        now = Local::now().format("%Y-%m-%d %H:%M:%S"),
        status_text = status_text,
        minutes = minutes,
        seconds = seconds,
        total = stats.total,
        passed = stats.passed,
        failed = stats.failed,
        skipped = stats.skipped,
        rates = rates,
        link_section = link_section
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::stats::SuiteStats;
    use chrono::Utc;

    fn stats(passed: u64, failed: u64, skipped: u64) -> SuiteStats {
        SuiteStats {
            suite_name: "Regression Suite".to_string(),
            total: passed + failed + skipped,
            passed,
            failed,
            skipped,
            started_at: Some(Utc::now()),
            finished_at: Some(Utc::now()),
            duration_ms: Some(125_000),
        }
    }

    #[test]
    fn subject_embeds_suite_name_and_timestamp() {
        let message = NotificationMessage::for_suite(
            &stats(2, 1, 0),
            None,
            "qa@example.com",
            &["team@example.com".to_string()],
        );
        assert!(message.subject.starts_with("Test Execution Report - Regression Suite - "));
        // Timestamp suffix: "YYYY-MM-DD HH:MM:SS"
        let suffix = message.subject.rsplit(" - ").next().unwrap();
        assert_eq!(suffix.len(), 19);
    }

    #[test]
    fn priority_is_high_iff_failures() {
        let failing = NotificationMessage::for_suite(&stats(2, 1, 0), None, "a@b.c", &[]);
        assert_eq!(failing.priority, Priority::High);
        assert_eq!(failing.priority.header_value(), 1);

        let green = NotificationMessage::for_suite(&stats(3, 0, 0), None, "a@b.c", &[]);
        assert_eq!(green.priority, Priority::Normal);
        assert_eq!(green.priority.header_value(), 3);
    }

    #[test]
    fn body_summarizes_counts_and_rates() {
        let message = NotificationMessage::for_suite(&stats(2, 1, 1), None, "a@b.c", &[]);
        let Body::Html(html) = &message.body else {
            panic!("expected HTML body");
        };
        assert!(html.contains("Overall Status: FAILED"));
        assert!(html.contains("<h3>4</h3><p>Total Tests</p>"));
        assert!(html.contains("Pass Rate:</strong> 50.0%"));
    }

    #[test]
    fn link_section_present_only_with_url() {
        let with_url = NotificationMessage::for_suite(
            &stats(1, 0, 0),
            Some("http://ci.example.com/job/suite/report"),
            "a@b.c",
            &[],
        );
        let Body::Html(html) = &with_url.body else {
            panic!("expected HTML body");
        };
        assert!(html.contains("http://ci.example.com/job/suite/report"));

        let without = NotificationMessage::for_suite(&stats(1, 0, 0), None, "a@b.c", &[]);
        let Body::Html(html) = &without.body else {
            panic!("expected HTML body");
        };
        assert!(!html.contains("View Detailed Report Online"));
    }
}
