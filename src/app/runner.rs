use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::args::LoadArgs;
use crate::error::{AppResult, ValidationError};
use crate::http::RequestExecutor;
use crate::metrics::{
    AggregateCounters, DrainReport, Level, LogPipeline, PipelineConfig, RunId, RunMetadataEvent,
};

use super::summary::{RunPlan, RunSummary};
use super::worker::{VirtualUser, WorkerContext, WorkerReport};

const START_MESSAGE: &str = "Load test started";

/// Fully resolved run parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub target_url: String,
    pub virtual_users: usize,
    pub requests_per_user: u64,
    pub log_dir: PathBuf,
    pub queue_capacity: usize,
}

impl RunConfig {
    #[must_use]
    pub fn from_args(args: &LoadArgs) -> Self {
        Self {
            target_url: args.url.clone(),
            virtual_users: args.virtual_users.get(),
            requests_per_user: args.requests_per_user.get(),
            log_dir: PathBuf::from(&args.log_dir),
            queue_capacity: args.queue_capacity.get(),
        }
    }

    /// # Errors
    ///
    /// Returns an error when users x requests does not fit in a `u64`.
    pub fn total_requests(&self) -> Result<u64, ValidationError> {
        u64::try_from(self.virtual_users)
            .ok()
            .and_then(|users| users.checked_mul(self.requests_per_user))
            .ok_or(ValidationError::TotalRequestsOverflow {
                users: self.virtual_users,
                requests: self.requests_per_user,
            })
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            log_dir: self.log_dir.clone(),
            queue_capacity: self.queue_capacity,
        }
    }
}

pub struct RunOutcome {
    pub run_id: RunId,
    pub log_path: PathBuf,
    pub summary: RunSummary,
    pub drain: DrainReport,
    pub workers: Vec<WorkerReport>,
    pub runtime_errors: Vec<String>,
}

/// A run whose log is open and whose start record is queued. Nothing has
/// been sent to the target yet.
pub struct PreparedRun {
    config: RunConfig,
    total_requests: u64,
    pipeline: LogPipeline,
}

/// Validates the run shape, opens the run log and records the start event.
///
/// # Errors
///
/// Returns an error when the run shape overflows or the log cannot be
/// created. No request has been attempted in either case.
pub async fn prepare_run(config: RunConfig) -> AppResult<PreparedRun> {
    let total_requests = config.total_requests()?;
    let pipeline = LogPipeline::open(&config.pipeline_config()).await?;

    let start = RunMetadataEvent::new(
        pipeline.run_id().clone(),
        Level::Info,
        START_MESSAGE.to_owned(),
    )
    .with_run_shape(
        config.virtual_users,
        config.requests_per_user,
        &config.target_url,
    );
    if !pipeline.submit(start.into()).await {
        debug!("Start record was not queued.");
    }

    Ok(PreparedRun {
        config,
        total_requests,
        pipeline,
    })
}

impl PreparedRun {
    #[must_use]
    pub const fn run_id(&self) -> &RunId {
        self.pipeline.run_id()
    }

    #[must_use]
    pub fn log_path(&self) -> &Path {
        self.pipeline.path()
    }

    #[must_use]
    pub fn plan(&self) -> RunPlan<'_> {
        RunPlan {
            target_url: &self.config.target_url,
            virtual_users: self.config.virtual_users,
            requests_per_user: self.config.requests_per_user,
            total_requests: self.total_requests,
            log_path: self.pipeline.path(),
        }
    }

    /// Runs every virtual user to completion, records the end event and
    /// closes the run log.
    ///
    /// # Errors
    ///
    /// Returns an error when the run log cannot be drained or closed.
    pub async fn execute(self, executor: Arc<dyn RequestExecutor>) -> AppResult<RunOutcome> {
        let PreparedRun {
            config,
            total_requests,
            mut pipeline,
        } = self;
        let run_id = pipeline.run_id().clone();
        let counters = Arc::new(AggregateCounters::new());

        info!(
            "Run {} starting: {} users x {} requests against {}",
            run_id, config.virtual_users, config.requests_per_user, config.target_url
        );

        let ctx = WorkerContext {
            executor,
            counters: Arc::clone(&counters),
            sink: pipeline.sink(),
            run_id: run_id.clone(),
        };
        let started = Instant::now();
        let mut handles = Vec::with_capacity(config.virtual_users);
        for id in 0..config.virtual_users {
            let user = VirtualUser {
                id,
                url: config.target_url.clone(),
                requests: config.requests_per_user,
            };
            handles.push(tokio::spawn(user.run(ctx.clone())));
        }
        drop(ctx);

        let mut workers = Vec::with_capacity(handles.len());
        let mut runtime_errors = Vec::new();
        for (id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(report) => workers.push(report),
                Err(err) => {
                    error!("Virtual user {} task failed: {}", id, err);
                    runtime_errors.push(format!("Virtual user {} task failed: {}", id, err));
                }
            }
        }
        let duration = started.elapsed();

        let summary = RunSummary::new(duration, &counters.snapshot());
        if summary.total_requests != total_requests {
            debug!(
                "Attempted {} of {} planned requests",
                summary.total_requests, total_requests
            );
        }

        let end = RunMetadataEvent::new(run_id.clone(), Level::Info, summary.completion_message())
            .with_run_shape(
                config.virtual_users,
                config.requests_per_user,
                &config.target_url,
            );
        if !pipeline.submit(end.into()).await {
            debug!("End record was not queued.");
        }

        let drain = pipeline.shutdown().await?;
        let log_path = pipeline.path().to_path_buf();

        Ok(RunOutcome {
            run_id,
            log_path,
            summary,
            drain,
            workers,
            runtime_errors,
        })
    }
}

/// Opens the run log, runs every virtual user and closes the log.
///
/// # Errors
///
/// Returns an error when the run cannot start or the log cannot be closed.
pub async fn run_load(
    config: RunConfig,
    executor: Arc<dyn RequestExecutor>,
) -> AppResult<RunOutcome> {
    prepare_run(config).await?.execute(executor).await
}
