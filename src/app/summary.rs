use std::path::Path;
use std::time::Duration;

use crate::args::OutputFormat;
use crate::metrics::CounterSnapshot;

use super::runner::RunOutcome;

/// End-of-run figures. Rates are fixed-point with two decimals (`x100`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub duration: Duration,
    pub total_requests: u64,
    pub successful: u64,
    pub errors: u64,
    pub success_avg_ms: u64,
    pub success_min_ms: u64,
    pub success_max_ms: u64,
    pub success_rate_x100: u64,
    pub rps_x100: u64,
}

impl RunSummary {
    #[must_use]
    pub fn new(duration: Duration, counters: &CounterSnapshot) -> Self {
        let total = counters.total();
        Self {
            duration,
            total_requests: total,
            successful: counters.successful,
            errors: counters.errors,
            success_avg_ms: counters.success_avg_ms(),
            success_min_ms: counters.success_min_ms,
            success_max_ms: counters.success_max_ms,
            success_rate_x100: rate_x100(counters.successful, total),
            rps_x100: per_second_x100(total, duration),
        }
    }

    /// Duration in seconds, two decimals.
    #[must_use]
    pub fn duration_secs(&self) -> String {
        let centis = u64::try_from(self.duration.as_millis() / 10).unwrap_or(u64::MAX);
        format_x100(centis)
    }

    /// Text of the closing metadata record.
    #[must_use]
    pub fn completion_message(&self) -> String {
        format!(
            "Load test completed - Duration: {}s, Success: {}/{} ({}%), Errors: {}, RPS: {}",
            self.duration_secs(),
            self.successful,
            self.total_requests,
            format_x100(self.success_rate_x100),
            self.errors,
            format_x100(self.rps_x100)
        )
    }
}

/// Shape of a run, known before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan<'a> {
    pub target_url: &'a str,
    pub virtual_users: usize,
    pub requests_per_user: u64,
    pub total_requests: u64,
    pub log_path: &'a Path,
}

pub(crate) fn start_lines(plan: &RunPlan<'_>) -> Vec<String> {
    vec![
        "Starting load test".to_owned(),
        format!("Target URL: {}", plan.target_url),
        format!("Virtual Users: {}", plan.virtual_users),
        format!("Requests per User: {}", plan.requests_per_user),
        format!("Total Requests: {}", plan.total_requests),
        format!("Log file: {}", plan.log_path.display()),
    ]
}

pub(crate) fn print_start(plan: &RunPlan<'_>, format: OutputFormat) {
    if format != OutputFormat::Text {
        return;
    }
    for line in start_lines(plan) {
        println!("{}", line);
    }
    println!();
}

pub(crate) fn summary_lines(outcome: &RunOutcome) -> Vec<String> {
    let summary = &outcome.summary;
    let mut lines = vec![
        "=== Test Summary ===".to_owned(),
        format!("Duration: {} seconds", summary.duration_secs()),
        format!("Total Requests: {}", summary.total_requests),
        format!(
            "Successful: {} ({}%)",
            summary.successful,
            format_x100(summary.success_rate_x100)
        ),
        format!("Errors: {}", summary.errors),
        format!(
            "Latency (ok) avg/min/max: {}ms / {}ms / {}ms",
            summary.success_avg_ms, summary.success_min_ms, summary.success_max_ms
        ),
        format!("Requests/sec: {}", format_x100(summary.rps_x100)),
    ];
    if outcome.drain.dropped > 0 {
        lines.push(format!(
            "Log records dropped: {}",
            outcome.drain.dropped
        ));
    }
    lines.push(String::new());
    lines.push(format!("Logs saved to: {}", outcome.log_path.display()));
    lines
}

pub(crate) fn summary_json(outcome: &RunOutcome) -> serde_json::Value {
    let summary = &outcome.summary;
    serde_json::json!({
        "test_run": outcome.run_id.as_str(),
        "log_path": outcome.log_path.display().to_string(),
        "duration_ms": summary.duration.as_millis(),
        "total_requests": summary.total_requests,
        "successful_requests": summary.successful,
        "error_requests": summary.errors,
        "success_rate": format_x100(summary.success_rate_x100),
        "success_avg_latency_ms": summary.success_avg_ms,
        "success_min_latency_ms": summary.success_min_ms,
        "success_max_latency_ms": summary.success_max_ms,
        "requests_per_sec": format_x100(summary.rps_x100),
        "log_records_written": outcome.drain.written,
        "log_records_dropped": outcome.drain.dropped,
        "runtime_errors": outcome.runtime_errors,
    })
}

/// # Errors
///
/// Returns an error when the JSON summary cannot be encoded.
pub(crate) fn print_summary(
    outcome: &RunOutcome,
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Text => {
            println!();
            for line in summary_lines(outcome) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&summary_json(outcome))?);
        }
    }
    Ok(())
}

fn rate_x100(numerator: u64, denominator: u64) -> u64 {
    let scaled = u128::from(numerator)
        .saturating_mul(10_000)
        .checked_div(u128::from(denominator))
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// Guards against a zero-length run by treating it as one millisecond.
fn per_second_x100(count: u64, duration: Duration) -> u64 {
    let duration_ms = duration.as_millis().max(1);
    let scaled = u128::from(count)
        .saturating_mul(100_000)
        .checked_div(duration_ms)
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

pub(crate) fn format_x100(value: u64) -> String {
    format!("{}.{:02}", value / 100, value % 100)
}
