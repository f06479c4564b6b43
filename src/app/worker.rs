use std::sync::Arc;

use tracing::debug;

use crate::http::RequestExecutor;
use crate::metrics::{AggregateCounters, LogSink, RequestOutcome, RunId};

/// Everything a virtual user shares with its siblings.
#[derive(Clone)]
pub struct WorkerContext {
    pub executor: Arc<dyn RequestExecutor>,
    pub counters: Arc<AggregateCounters>,
    pub sink: LogSink,
    pub run_id: RunId,
}

/// One simulated client issuing its requests back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualUser {
    pub id: usize,
    pub url: String,
    pub requests: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub id: usize,
    pub successes: u64,
    pub errors: u64,
    /// Outcomes the log sink did not accept. Counters still include them.
    pub unlogged: u64,
}

impl WorkerReport {
    #[must_use]
    pub const fn attempted(&self) -> u64 {
        self.successes.saturating_add(self.errors)
    }
}

impl VirtualUser {
    /// Issues every request in sequence. Failures are recorded, never retried,
    /// and never end the loop early.
    pub async fn run(self, ctx: WorkerContext) -> WorkerReport {
        let mut report = WorkerReport {
            id: self.id,
            ..WorkerReport::default()
        };

        for _ in 0..self.requests {
            let outcome = match ctx.executor.execute(&self.url).await {
                Ok(response) => RequestOutcome::response(
                    ctx.run_id.clone(),
                    self.id,
                    self.url.clone(),
                    response.status,
                    response.elapsed,
                ),
                Err(err) => RequestOutcome::failure(
                    ctx.run_id.clone(),
                    self.id,
                    self.url.clone(),
                    err.into_message(),
                ),
            };

            ctx.counters.record(&outcome);
            if outcome.is_success() {
                report.successes = report.successes.saturating_add(1);
            } else {
                report.errors = report.errors.saturating_add(1);
            }

            if !ctx.sink.submit(outcome.into()).await {
                report.unlogged = report.unlogged.saturating_add(1);
            }
        }

        debug!(
            "Virtual user {} finished: {} ok, {} failed",
            report.id, report.successes, report.errors
        );
        report
    }
}
