//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
pub(crate) mod test_support;
#[cfg(test)]
mod tests;

pub use cli::LoadArgs;
pub use defaults::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_LOG_DIR, DEFAULT_QUEUE_CAPACITY, DEFAULT_REQUESTS_PER_USER,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_TARGET_URL, DEFAULT_USER_AGENT, DEFAULT_VIRTUAL_USERS,
};
pub use types::{HttpMethod, OutputFormat, PositiveU64, PositiveUsize};

pub(crate) use parsers::parse_duration_arg;
