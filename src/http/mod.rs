//! HTTP transport: target validation, client construction, and the executor
//! seam virtual users call through.
mod client;
mod executor;

#[cfg(test)]
mod tests;

pub use client::{ClientSettings, build_client, validate_target_url};
pub use executor::{HttpExecutor, HttpResponse, RequestExecutor, TransportError};
