//! Asynchronous NDJSON run log.
//!
//! Virtual users push [`LogRecord`]s into a bounded queue through cloned
//! [`LogSink`]s; a single drain task owns the file and is its only writer.
//! Shutdown is two-phase: the queue is closed for writes, the drain task
//! delivers the backlog and exits, and only then is the file synced and
//! released.
#[cfg(test)]
mod reader;
mod writer;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::PipelineError;

use super::{LogRecord, RunId};

#[cfg(test)]
pub(crate) use reader::read_run_log;
#[cfg(test)]
pub(crate) use writer::drain_records;

const LOG_BUFFER_SIZE: usize = 64 * 1024;
const MAX_NAME_ATTEMPTS: u32 = 1_000;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub log_dir: PathBuf,
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Accepting records and draining.
    Open,
    /// Closed to new records, flushing the backlog.
    Draining,
    /// File handle released.
    Closed,
}

/// What the drain task did over the pipeline's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub written: u64,
    /// Records that could not be encoded. They are skipped, never retried.
    pub dropped: u64,
}

/// Cloneable submission handle. A disabled sink accepts nothing and never
/// fails, so callers do not need to know whether logging is active.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    sender: Option<mpsc::Sender<LogRecord>>,
}

impl LogSink {
    #[must_use]
    pub const fn disabled() -> Self {
        Self { sender: None }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Queues one record, waiting for space when the queue is full.
    ///
    /// Returns `false` when the record was not queued: the sink is disabled
    /// or the pipeline has stopped accepting records.
    pub async fn submit(&self, record: LogRecord) -> bool {
        let Some(sender) = self.sender.as_ref() else {
            return false;
        };
        match sender.send(record).await {
            Ok(()) => true,
            Err(_) => {
                debug!("Log queue closed; record discarded.");
                false
            }
        }
    }
}

pub(crate) type DrainOutput = Result<(BufWriter<File>, DrainReport), PipelineError>;

pub struct LogPipeline {
    run_id: RunId,
    path: PathBuf,
    state: PipelineState,
    sender: Option<mpsc::Sender<LogRecord>>,
    close_tx: Option<oneshot::Sender<()>>,
    drain: Option<JoinHandle<DrainOutput>>,
}

impl LogPipeline {
    /// Creates the log directory and a fresh log file for a new run, then
    /// starts the drain task. An existing run log is never reopened.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory or the file cannot be created.
    pub async fn open(config: &PipelineConfig) -> Result<Self, PipelineError> {
        tokio::fs::create_dir_all(&config.log_dir)
            .await
            .map_err(|err| PipelineError::CreateDir {
                path: config.log_dir.clone(),
                source: err,
            })?;
        let (run_id, path, file) =
            create_run_file(&config.log_dir, &RunId::from_start(Utc::now())).await?;
        let writer = BufWriter::with_capacity(LOG_BUFFER_SIZE, file);

        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let (close_tx, close_rx) = oneshot::channel();
        let drain = tokio::spawn(writer::drain_records(writer, receiver, close_rx));

        debug!(
            "Run log opened at {} (queue capacity {})",
            path.display(),
            config.queue_capacity
        );

        Ok(Self {
            run_id,
            path,
            state: PipelineState::Open,
            sender: Some(sender),
            close_tx: Some(close_tx),
            drain: Some(drain),
        })
    }

    #[must_use]
    pub const fn run_id(&self) -> &RunId {
        &self.run_id
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// A new submission handle; disabled once shutdown has begun.
    #[must_use]
    pub fn sink(&self) -> LogSink {
        LogSink {
            sender: self.sender.clone(),
        }
    }

    /// Queues a record from the owner of the pipeline.
    pub async fn submit(&self, record: LogRecord) -> bool {
        match self.sender.as_ref() {
            Some(sender) => sender.send(record).await.is_ok(),
            None => false,
        }
    }

    /// Closes the queue, waits for the drain task to deliver every queued
    /// record, then syncs and releases the file.
    ///
    /// # Errors
    ///
    /// Returns an error when called twice, when the drain task failed to
    /// write, or when the final flush/sync fails.
    pub async fn shutdown(&mut self) -> Result<DrainReport, PipelineError> {
        if self.state != PipelineState::Open {
            return Err(PipelineError::AlreadyClosed);
        }
        self.state = PipelineState::Draining;
        drop(self.sender.take());
        if let Some(close_tx) = self.close_tx.take() {
            // The drain task may already have exited on a write error.
            drop(close_tx.send(()));
        }
        let Some(drain) = self.drain.take() else {
            self.state = PipelineState::Closed;
            return Err(PipelineError::AlreadyClosed);
        };

        let joined = drain.await;
        self.state = PipelineState::Closed;
        let (writer, report) = joined.map_err(|err| PipelineError::DrainJoin { source: err })??;
        close_file(writer).await?;

        info!(
            "Run log closed: {} records written, {} dropped ({})",
            report.written,
            report.dropped,
            self.path.display()
        );
        Ok(report)
    }
}

fn log_file_name(run_id: &RunId) -> String {
    format!("loadtest_{}.jsonl", run_id)
}

/// Creates `loadtest_<run id>.jsonl` exclusively. When another run already
/// owns that name the id gets a `-N` suffix, so id and file name stay paired.
pub(crate) async fn create_run_file(
    log_dir: &Path,
    base: &RunId,
) -> Result<(RunId, PathBuf, File), PipelineError> {
    let mut attempt: u32 = 0;
    loop {
        let run_id = if attempt == 0 {
            base.clone()
        } else {
            base.with_suffix(attempt)
        };
        let path = log_dir.join(log_file_name(&run_id));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((run_id, path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                debug!("Run log {} already exists, retrying", path.display());
                attempt = attempt.saturating_add(1);
            }
            Err(err) => return Err(PipelineError::CreateFile { path, source: err }),
        }
    }
}

async fn close_file(mut writer: BufWriter<File>) -> Result<(), PipelineError> {
    writer.flush().await.map_err(|err| PipelineError::Io {
        context: "flush run log",
        source: err,
    })?;
    let file = writer.into_inner();
    file.sync_all().await.map_err(|err| PipelineError::Io {
        context: "sync run log",
        source: err,
    })?;
    drop(file);
    Ok(())
}
