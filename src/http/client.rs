use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::HttpError;

/// Transport knobs shared by every virtual user of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

/// Parses the target and rejects anything that is not http(s).
///
/// # Errors
///
/// Returns an error when the URL does not parse or uses another scheme.
pub fn validate_target_url(raw: &str) -> Result<Url, HttpError> {
    let url = Url::parse(raw).map_err(|err| HttpError::InvalidUrl {
        url: raw.to_owned(),
        source: err,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(HttpError::UnsupportedScheme {
            url: raw.to_owned(),
            scheme: other.to_owned(),
        }),
    }
}

/// Builds the pooled client. The pool is shared by all virtual users, so
/// connections are reused across them once their bodies are drained.
///
/// # Errors
///
/// Returns an error when the TLS backend cannot be initialised.
pub fn build_client(settings: &ClientSettings) -> Result<Client, HttpError> {
    Client::builder()
        .timeout(settings.request_timeout)
        .connect_timeout(settings.connect_timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|err| HttpError::BuildClientFailed { source: err })
}
