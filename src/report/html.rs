use super::types::{SuiteReport, TestStatus};
use crate::runner::steps::StepStatus;

/// Render the suite report as a single self-contained HTML document.
pub fn render(model: &SuiteReport) -> String {
    let stats = &model.stats;
    let pass_rate = stats.pass_rate().round() as u64;

    let mut tests_html = String::new();
    for test in &model.tests {
        let (status_text, status_class) = match test.status {
            TestStatus::Passed => ("Passed", "passed"),
            TestStatus::Failed => ("Failed", "failed"),
            TestStatus::Skipped => ("Skipped", "skipped"),
        };

        let mut steps_html = String::new();
        for step in &test.steps {
            let (status_icon, step_class) = match step.status {
                StepStatus::Info => ("ℹ", "info"),
                StepStatus::Pass => ("✓", "passed"),
                StepStatus::Fail => ("✗", "failed"),
                StepStatus::Warning => ("⚠", "warning"),
            };

            let screenshot_html = if let Some(path) = &step.screenshot {
                // Screenshots live next to the reports directory, so links
                // go up one level.
                format!(
                    r##"<a class="screenshot-link" href="../{path}" target="_blank">📸 Screenshot</a>"##,
                    path = path
                )
            } else {
                String::new()
            };

            steps_html.push_str(&format!(
                r##"
                <div class="step {step_class}">
                    <div class="step-icon">{status_icon}</div>
                    <div class="step-content">
                        <div class="step-message">Step {index}: {message}</div>
                        <div class="step-meta">
                            <span class="timestamp">{timestamp}</span>
                            {screenshot_html}
                        </div>
                    </div>
                </div>
            "##,
                step_class = step_class,
                status_icon = status_icon,
                index = step.index,
                message = html_escape(&step.message),
                timestamp = step.timestamp.format("%H:%M:%S%.3f"),
                screenshot_html = screenshot_html
            ));
        }

        let failure_html = if let Some(failure) = &test.failure {
            format!(
                r##"<div class="error-message">{}</div>"##,
                html_escape(failure)
            )
        } else {
            String::new()
        };

        tests_html.push_str(&format!(
            r#"
            <div class="test {status_class}">
                <div class="test-header">
                    <h3>{name} <span class="test-status-badge">{status_text}</span></h3>
                    <div>
                        <span class="category">{category}</span>
                        <span class="duration">{duration}</span>
                    </div>
                </div>
                <div class="steps">
                    {steps_html}
                </div>
                {failure_html}
            </div>
        "#,
            status_class = status_class,
            name = html_escape(&test.name),
            status_text = status_text,
            category = html_escape(&test.category),
            duration = format_duration(test.duration_ms),
            steps_html = steps_html,
            failure_html = failure_html
        ));
    }

    let window = match (&stats.started_at, &stats.finished_at) {
        (Some(start), Some(end)) => format!(
            "{} — {}",
            start.format("%Y-%m-%d %H:%M:%S"),
            end.format("%Y-%m-%d %H:%M:%S")
        ),
        _ => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Suite Report - {suite_name}</title>
    <style>
        :root {{
            --bg-primary: #0a0f1d;
            --bg-secondary: #141b2d;
            --bg-tertiary: #1f2937;
            --border: #374151;
            --text-primary: #f9fafb;
            --text-secondary: #9ca3af;
            --green: #10b981;
            --red: #ef4444;
            --yellow: #f59e0b;
            --blue: #3b82f6;
            --glass: rgba(255, 255, 255, 0.03);
        }}

        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}

        body {{
            font-family: system-ui, -apple-system, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.5;
            padding: 3rem 1rem;
        }}

        .container {{
            max-width: 1100px;
            margin: 0 auto;
        }}

        header {{
            margin-bottom: 3rem;
            display: flex;
            justify-content: space-between;
            align-items: flex-end;
        }}

        h1 {{
            font-size: 2rem;
            font-weight: 800;
            letter-spacing: -0.025em;
        }}

        .summary {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
            gap: 1.5rem;
            margin-bottom: 3rem;
        }}

        .stat {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            padding: 1.5rem;
            border-radius: 1rem;
        }}

        .stat-value {{
            font-size: 2.5rem;
            font-weight: 800;
            margin-bottom: 0.25rem;
        }}

        .stat-label {{
            color: var(--text-secondary);
            font-size: 0.875rem;
            font-weight: 500;
            text-transform: uppercase;
            letter-spacing: 0.05em;
        }}

        .stat.passed .stat-value {{ color: var(--green); }}
        .stat.failed .stat-value {{ color: var(--red); }}
        .stat.skipped .stat-value {{ color: var(--yellow); }}

        .progress-container {{
            margin-bottom: 4rem;
        }}

        .progress-bar {{
            background: var(--bg-secondary);
            height: 12px;
            border-radius: 6px;
            overflow: hidden;
            display: flex;
            border: 1px solid var(--border);
        }}

        .progress-fill {{
            height: 100%;
            background: linear-gradient(90deg, var(--green), #34d399);
        }}

        .test {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 1.25rem;
            margin-bottom: 2rem;
            overflow: hidden;
        }}

        .test-header {{
            padding: 1.5rem;
            background: var(--glass);
            display: flex;
            justify-content: space-between;
            align-items: center;
            border-bottom: 1px solid var(--border);
        }}

        .test-header h3 {{
            font-size: 1.25rem;
            font-weight: 700;
            display: flex;
            align-items: center;
            gap: 0.75rem;
        }}

        .test-status-badge {{
            padding: 0.25rem 0.75rem;
            border-radius: 9999px;
            font-size: 0.75rem;
            font-weight: 600;
            text-transform: uppercase;
        }}

        .test.passed .test-status-badge {{ background: rgba(16, 185, 129, 0.1); color: var(--green); }}
        .test.failed .test-status-badge {{ background: rgba(239, 68, 68, 0.1); color: var(--red); }}
        .test.skipped .test-status-badge {{ background: rgba(245, 158, 11, 0.1); color: var(--yellow); }}

        .category {{
            color: var(--text-secondary);
            font-size: 0.8125rem;
            margin-right: 1rem;
        }}

        .duration {{
            color: var(--text-secondary);
            font-size: 0.75rem;
            font-weight: 500;
        }}

        .steps {{
            padding: 1rem 1.5rem;
        }}

        .step {{
            padding: 0.75rem 1rem;
            border-radius: 0.75rem;
            display: flex;
            align-items: flex-start;
            gap: 1rem;
            margin-bottom: 0.5rem;
        }}

        .step:hover {{
            background: var(--bg-tertiary);
        }}

        .step-icon {{
            width: 2rem;
            height: 2rem;
            display: flex;
            align-items: center;
            justify-content: center;
            border-radius: 0.5rem;
            font-size: 1.1rem;
            flex-shrink: 0;
        }}

        .step.passed .step-icon {{ background: rgba(16, 185, 129, 0.1); color: var(--green); }}
        .step.failed .step-icon {{ background: rgba(239, 68, 68, 0.1); color: var(--red); }}
        .step.warning .step-icon {{ background: rgba(245, 158, 11, 0.1); color: var(--yellow); }}
        .step.info .step-icon {{ background: rgba(59, 130, 246, 0.1); color: var(--blue); }}

        .step-content {{
            flex: 1;
        }}

        .step-message {{
            font-size: 0.9375rem;
            font-weight: 500;
        }}

        .step-meta {{
            display: flex;
            gap: 1rem;
            margin-top: 0.25rem;
        }}

        .timestamp {{
            color: var(--text-secondary);
            font-size: 0.75rem;
        }}

        .screenshot-link {{
            color: var(--blue);
            font-size: 0.75rem;
            font-weight: 600;
            text-decoration: none;
        }}

        .screenshot-link:hover {{
            text-decoration: underline;
        }}

        .error-message {{
            background: rgba(239, 68, 68, 0.1);
            border-radius: 0.5rem;
            padding: 0.75rem;
            margin: 0 1.5rem 1.5rem 1.5rem;
            color: #fca5a5;
            font-size: 0.8125rem;
            font-family: monospace;
            border: 1px solid rgba(239, 68, 68, 0.2);
        }}

        .meta {{
            margin-top: 4rem;
            padding-top: 2rem;
            border-top: 1px solid var(--border);
            color: var(--text-secondary);
            font-size: 0.875rem;
            text-align: center;
            display: flex;
            justify-content: center;
            gap: 2rem;
        }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <div>
                <div style="font-size: 0.875rem; font-weight: 600; color: var(--blue); text-transform: uppercase; letter-spacing: 0.1em; margin-bottom: 0.5rem;">Automated Testing</div>
                <h1>{suite_name}</h1>
            </div>
            <div style="text-align: right;">
                <div style="font-size: 0.875rem; color: var(--text-secondary);">{window}</div>
                <div style="font-size: 1.25rem; font-weight: 700;">{duration}</div>
            </div>
        </header>

        <div class="summary">
            <div class="stat">
                <div class="stat-value">{total}</div>
                <div class="stat-label">Total Tests</div>
            </div>
            <div class="stat passed">
                <div class="stat-value">{passed}</div>
                <div class="stat-label">Passed</div>
            </div>
            <div class="stat failed">
                <div class="stat-value">{failed}</div>
                <div class="stat-label">Failed</div>
            </div>
            <div class="stat skipped">
                <div class="stat-value">{skipped}</div>
                <div class="stat-label">Skipped</div>
            </div>
        </div>

        <div class="progress-container">
            <div style="display: flex; justify-content: space-between; margin-bottom: 0.75rem;">
                <span style="font-weight: 600; font-size: 0.875rem;">Pass Rate</span>
                <span style="font-weight: 700; color: var(--green);">{pass_rate}%</span>
            </div>
            <div class="progress-bar">
                <div class="progress-fill" style="width: {pass_rate}%"></div>
            </div>
        </div>

        {tests_html}

        <div class="meta">
            <span>Suite: {suite_name}</span>
            <span>Generated: {generated_at}</span>
        </div>
    </div>
</body>
</html>"#,
        suite_name = html_escape(&stats.suite_name),
        window = window,
        duration = format_duration(stats.duration_ms.unwrap_or(0)),
        total = stats.total,
        passed = stats.passed,
        failed = stats.failed,
        skipped = stats.skipped,
        pass_rate = pass_rate,
        tests_html = tests_html,
        generated_at = model.generated_at
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60000;
        let seconds = (ms % 60000) as f64 / 1000.0;
        format!("{}m {:.0}s", minutes, seconds)
    }
}
