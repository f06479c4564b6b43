//! Core library for the `vuload` CLI.
//!
//! A fixed pool of virtual users each issue a fixed number of GET requests
//! against one target. Every outcome is counted atomically and written to a
//! per-run NDJSON log by a single background writer fed through a bounded
//! queue. The binary is a thin wrapper around [`entry::run`].
pub mod app;
pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod metrics;
mod system;
