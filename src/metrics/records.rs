use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::args::HttpMethod;

/// Severity attached to every record in the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    /// 2xx is `info`; any other status is `warning`.
    #[must_use]
    pub const fn for_status(status: u16) -> Self {
        if is_success_status(status) {
            Level::Info
        } else {
            Level::Warning
        }
    }
}

#[must_use]
pub const fn is_success_status(status: u16) -> bool {
    status >= 200 && status < 300
}

/// Names one run. Derived from the run start time and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    #[must_use]
    pub fn from_start(start: DateTime<Utc>) -> Self {
        Self(start.format("%Y%m%d-%H%M%S%.3f").to_string())
    }

    /// Disambiguates runs that started in the same millisecond.
    #[must_use]
    pub fn with_suffix(&self, attempt: u32) -> Self {
        Self(format!("{}-{}", self.0, attempt))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one dispatched request, as persisted in the run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOutcome {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub test_run: RunId,
    pub vu: usize,
    pub status: u16,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    pub url: String,
    pub method: HttpMethod,
}

impl RequestOutcome {
    /// A request that produced an HTTP response, whatever its status.
    #[must_use]
    pub fn response(
        test_run: RunId,
        vu: usize,
        url: String,
        status: u16,
        elapsed: Duration,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level: Level::for_status(status),
            test_run,
            vu,
            status,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            error: String::new(),
            url,
            method: HttpMethod::Get,
        }
    }

    /// A request that failed before a response was obtained.
    #[must_use]
    pub fn failure(test_run: RunId, vu: usize, url: String, error: String) -> Self {
        Self {
            timestamp: Utc::now(),
            level: Level::Error,
            test_run,
            vu,
            status: 0,
            duration_ms: 0,
            error,
            url,
            method: HttpMethod::Get,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_empty() && is_success_status(self.status)
    }
}

/// Run milestone (start/end) sharing the request stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadataEvent {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub test_run: RunId,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_users: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_user: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_requests: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

impl RunMetadataEvent {
    #[must_use]
    pub fn new(test_run: RunId, level: Level, message: String) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            test_run,
            message,
            virtual_users: None,
            requests_per_user: None,
            total_requests: None,
            target_url: None,
        }
    }

    #[must_use]
    pub fn with_run_shape(
        mut self,
        virtual_users: usize,
        requests_per_user: u64,
        target_url: &str,
    ) -> Self {
        self.virtual_users = Some(virtual_users);
        self.requests_per_user = Some(requests_per_user);
        self.total_requests = Some(
            u64::try_from(virtual_users)
                .unwrap_or(u64::MAX)
                .saturating_mul(requests_per_user),
        );
        self.target_url = Some(target_url.to_owned());
        self
    }
}

/// One line of the run log. The two shapes are told apart by their fields,
/// so the encoding carries no explicit tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogRecord {
    Request(RequestOutcome),
    Metadata(RunMetadataEvent),
}

impl LogRecord {
    #[must_use]
    pub const fn test_run(&self) -> &RunId {
        match self {
            LogRecord::Request(outcome) => &outcome.test_run,
            LogRecord::Metadata(event) => &event.test_run,
        }
    }
}

impl From<RequestOutcome> for LogRecord {
    fn from(value: RequestOutcome) -> Self {
        LogRecord::Request(value)
    }
}

impl From<RunMetadataEvent> for LogRecord {
    fn from(value: RunMetadataEvent) -> Self {
        LogRecord::Metadata(value)
    }
}
