use std::error::Error as _;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::error::HttpError;

use super::client::{ClientSettings, build_client};

/// A response that arrived, whatever its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// From dispatch to the end of the body.
    pub elapsed: Duration,
}

/// No usable response: connect/DNS failure, timeout, or a broken body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn into_message(self) -> String {
        self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(describe(&err))
    }
}

/// Issues a single GET. Implementations must not retry.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Executor backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns an error when the client cannot be built.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, HttpError> {
        build_client(settings).map(Self::new)
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let started = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let bytes = drain_response_body(response).await?;
        let elapsed = started.elapsed();
        debug!("GET {} -> {} ({} bytes, {:?})", url, status, bytes, elapsed);
        Ok(HttpResponse { status, elapsed })
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

/// `reqwest` keeps the cause (refused, DNS, ...) in the source chain.
fn describe(err: &reqwest::Error) -> String {
    let mut message = if err.is_timeout() {
        format!("timeout: {}", err)
    } else {
        err.to_string()
    };
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
