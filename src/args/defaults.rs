pub const DEFAULT_USER_AGENT: &str = concat!("vuload/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TARGET_URL: &str = "https://httpbin.org/get";
pub const DEFAULT_VIRTUAL_USERS: &str = "20";
pub const DEFAULT_REQUESTS_PER_USER: &str = "10";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
pub const DEFAULT_CONNECT_TIMEOUT: &str = "10s";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Slots between the virtual users and the log writer.
pub const DEFAULT_QUEUE_CAPACITY: &str = "10000";
