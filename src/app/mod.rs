//! Run coordination: virtual users, the run lifecycle, and reporting.
mod runner;
mod runtime_errors;
mod summary;
mod worker;


pub use runner::{PreparedRun, RunConfig, RunOutcome, prepare_run, run_load};
pub use summary::{RunPlan, RunSummary};
pub use worker::{VirtualUser, WorkerContext, WorkerReport};

pub(crate) use runtime_errors::print_runtime_errors;
pub(crate) use summary::{print_start, print_summary};
