use clap::Parser;
use std::time::Duration;

use super::defaults::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_LOG_DIR, DEFAULT_QUEUE_CAPACITY, DEFAULT_REQUESTS_PER_USER,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_TARGET_URL, DEFAULT_VIRTUAL_USERS,
};
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_positive_u64, parse_positive_usize,
};
use super::types::{OutputFormat, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Virtual-user HTTP load harness: a fixed number of concurrent users each issue a fixed number of GET requests, every request lands in an NDJSON run log."
)]
pub struct LoadArgs {
    /// Target URL (GET)
    #[arg(long, short, default_value = DEFAULT_TARGET_URL)]
    pub url: String,

    /// Number of concurrent virtual users
    #[arg(
        long = "users",
        short = 'c',
        alias = "virtual-users",
        default_value = DEFAULT_VIRTUAL_USERS,
        value_parser = parse_positive_usize
    )]
    pub virtual_users: PositiveUsize,

    /// Requests issued sequentially by each virtual user
    #[arg(
        long = "requests",
        short = 'r',
        alias = "requests-per-user",
        default_value = DEFAULT_REQUESTS_PER_USER,
        value_parser = parse_positive_u64
    )]
    pub requests_per_user: PositiveU64,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = DEFAULT_REQUEST_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = DEFAULT_CONNECT_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// Directory receiving one NDJSON log file per run
    #[arg(long = "log-dir", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: String,

    /// Capacity of the log queue between virtual users and the log writer
    #[arg(
        long = "queue-capacity",
        default_value = DEFAULT_QUEUE_CAPACITY,
        value_parser = parse_positive_usize
    )]
    pub queue_capacity: PositiveUsize,

    /// Summary output format
    #[arg(long = "output-format", value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Path to config file (TOML/JSON). Defaults to ./vuload.toml or ./vuload.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by VULOAD_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
