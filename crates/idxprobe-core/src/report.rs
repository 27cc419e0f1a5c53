//! End-of-run summary rendering: plain-text console report, JSON, and an
//! optional self-contained HTML dashboard.

use crate::error::CoreResult;
use crate::metrics::RunSummary;
use crate::threshold::ThresholdVerdict;
use std::fmt::Write as _;
use std::path::Path;

/// Renders the console report printed after teardown.
pub fn render_text(summary: &RunSummary, verdicts: &[ThresholdVerdict]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "checks");
    for check in &summary.checks {
        let total = check.passes + check.failures;
        let mark = if check.failures == 0 { '✓' } else { '✗' };
        let _ = writeln!(
            out,
            "  {mark} {:<42} {} passed, {} failed ({total} total)",
            check.name, check.passes, check.failures
        );
    }

    let _ = writeln!(out, "\nendpoints");
    let _ = writeln!(
        out,
        "  {:<20} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10}",
        "name", "reqs", "failed", "p50 ms", "p95 ms", "p99 ms", "max ms"
    );
    for endpoint in &summary.endpoints {
        let _ = writeln!(
            out,
            "  {:<20} {:>8} {:>8} {:>10.1} {:>10.1} {:>10.1} {:>10.1}",
            endpoint.name,
            endpoint.requests,
            endpoint.failures,
            endpoint.latency.p50_ms,
            endpoint.latency.p95_ms,
            endpoint.latency.p99_ms,
            endpoint.latency.max_ms
        );
    }

    let _ = writeln!(
        out,
        "\nrequests: {} total, {} failed ({:.2}% failure rate, {:.2}% error rate)",
        summary.total_requests,
        summary.failed_requests,
        summary.request_failure_rate * 100.0,
        summary.error_rate * 100.0
    );
    let _ = writeln!(
        out,
        "duration: p50={:.1} ms p90={:.1} ms p95={:.1} ms p99={:.1} ms max={:.1} ms",
        summary.aggregate.p50_ms,
        summary.aggregate.p90_ms,
        summary.aggregate.p95_ms,
        summary.aggregate.p99_ms,
        summary.aggregate.max_ms
    );

    let _ = writeln!(out, "\nthresholds");
    for verdict in verdicts {
        let mark = if verdict.passed { '✓' } else { '✗' };
        let _ = writeln!(out, "  {mark} {} (actual: {:.2})", verdict.description, verdict.actual);
    }

    out
}

/// Renders the summary as pretty-printed JSON.
pub fn render_json(summary: &RunSummary) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Renders a single self-contained HTML page of the same summary.
pub fn render_html(summary: &RunSummary, verdicts: &[ThresholdVerdict]) -> String {
    let mut endpoint_rows = String::new();
    for endpoint in &summary.endpoints {
        let _ = write!(
            endpoint_rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td></tr>",
            endpoint.name,
            endpoint.requests,
            endpoint.failures,
            endpoint.latency.p50_ms,
            endpoint.latency.p95_ms,
            endpoint.latency.p99_ms,
            endpoint.latency.max_ms
        );
    }

    let mut check_rows = String::new();
    for check in &summary.checks {
        let state = if check.failures == 0 { "pass" } else { "fail" };
        let _ = write!(
            check_rows,
            "<tr class=\"{state}\"><td>{}</td><td>{}</td><td>{}</td></tr>",
            check.name, check.passes, check.failures
        );
    }

    let mut threshold_rows = String::new();
    for verdict in verdicts {
        let state = if verdict.passed { "pass" } else { "fail" };
        let _ = write!(
            threshold_rows,
            "<tr class=\"{state}\"><td>{}</td><td>{:.2}</td><td>{}</td></tr>",
            verdict.description,
            verdict.actual,
            if verdict.passed { "passed" } else { "failed" }
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>idxprobe report</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
table {{ border-collapse: collapse; margin-bottom: 2em; }}
th, td {{ border: 1px solid #ccc; padding: 4px 10px; text-align: left; }}
tr.pass td {{ background: #eaffea; }}
tr.fail td {{ background: #ffeaea; }}
</style>
</head>
<body>
<h1>idxprobe load test report</h1>
<p>{total} requests, {failed} failed ({failure_rate:.2}% failure rate, {error_rate:.2}% error rate)</p>
<h2>Endpoints</h2>
<table>
<tr><th>name</th><th>requests</th><th>failed</th><th>p50 ms</th><th>p95 ms</th><th>p99 ms</th><th>max ms</th></tr>
{endpoint_rows}
</table>
<h2>Checks</h2>
<table>
<tr><th>check</th><th>passed</th><th>failed</th></tr>
{check_rows}
</table>
<h2>Thresholds</h2>
<table>
<tr><th>condition</th><th>actual</th><th>verdict</th></tr>
{threshold_rows}
</table>
</body>
</html>
"#,
        total = summary.total_requests,
        failed = summary.failed_requests,
        failure_rate = summary.request_failure_rate * 100.0,
        error_rate = summary.error_rate * 100.0,
    )
}

/// Writes the HTML dashboard to `path`, creating parent directories.
pub fn export_html(
    path: impl AsRef<Path>,
    summary: &RunSummary,
    verdicts: &[ThresholdVerdict],
) -> CoreResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, render_html(summary, verdicts))?;
    Ok(())
}
