//! Run records, atomic aggregation, and the asynchronous run log.
mod counters;
mod logging;
mod records;


pub use counters::{AggregateCounters, CounterSnapshot};
pub use logging::{DrainReport, LogPipeline, LogSink, PipelineConfig, PipelineState};
pub use records::{Level, LogRecord, RequestOutcome, RunId, RunMetadataEvent};

#[cfg(test)]
pub(crate) use logging::{create_run_file, drain_records, read_run_log};
