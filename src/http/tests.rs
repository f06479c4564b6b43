use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use super::*;
use crate::error::HttpError;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

fn settings() -> ClientSettings {
    ClientSettings {
        request_timeout: Duration::from_secs(2),
        connect_timeout: Duration::from_secs(1),
    }
}

async fn spawn_http_server(
    status_line: &'static str,
    body: &'static str,
) -> Result<(String, JoinHandle<Result<(), String>>), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("Failed to bind HTTP server: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read HTTP addr: {}", err))?;

    let task = tokio::spawn(async move {
        let (mut stream, _) = timeout(TEST_TIMEOUT, listener.accept())
            .await
            .map_err(|_err| "HTTP accept timed out".to_owned())?
            .map_err(|err| format!("HTTP accept failed: {}", err))?;
        let mut req = Vec::with_capacity(1024);
        loop {
            let mut chunk = [0_u8; 1024];
            let read = timeout(TEST_TIMEOUT, stream.read(&mut chunk))
                .await
                .map_err(|_err| "HTTP read timed out".to_owned())?
                .map_err(|err| format!("HTTP read failed: {}", err))?;
            if read == 0 {
                break;
            }
            let prefix = chunk
                .get(..read)
                .ok_or_else(|| "read buffer prefix out of range".to_owned())?;
            req.extend_from_slice(prefix);
            if req.windows(4).any(|bytes| bytes == b"\r\n\r\n") {
                break;
            }
        }
        if !req.starts_with(b"GET ") {
            return Err("Expected a GET request".to_owned());
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        timeout(TEST_TIMEOUT, stream.write_all(response.as_bytes()))
            .await
            .map_err(|_err| "HTTP write timed out".to_owned())?
            .map_err(|err| format!("HTTP write failed: {}", err))?;
        Ok(())
    });
    Ok((format!("http://{}/", addr), task))
}

async fn join_server(task: JoinHandle<Result<(), String>>) -> Result<(), String> {
    task.await
        .map_err(|err| format!("server task failed: {}", err))?
}

#[test]
fn validate_target_url_accepts_http_and_https() -> Result<(), String> {
    for raw in ["http://localhost:8080/health", "https://example.com/"] {
        validate_target_url(raw).map_err(|err| format!("{} rejected: {}", raw, err))?;
    }
    Ok(())
}

#[test]
fn validate_target_url_rejects_bad_input() -> Result<(), String> {
    match validate_target_url("not a url") {
        Err(HttpError::InvalidUrl { .. }) => {}
        other => return Err(format!("Expected InvalidUrl, got {:?}", other)),
    }
    match validate_target_url("ftp://example.com/") {
        Err(HttpError::UnsupportedScheme { scheme, .. }) if scheme == "ftp" => Ok(()),
        other => Err(format!("Expected UnsupportedScheme, got {:?}", other)),
    }
}

#[tokio::test]
async fn http_executor_reports_status_and_drains_body() -> Result<(), String> {
    let (url, server) = spawn_http_server("200 OK", "hello world").await?;
    let executor =
        HttpExecutor::from_settings(&settings()).map_err(|err| format!("client: {}", err))?;

    let response = executor
        .execute(&url)
        .await
        .map_err(|err| format!("request failed: {}", err))?;
    join_server(server).await?;

    if response.status != 200 {
        return Err(format!("Unexpected status: {}", response.status));
    }
    if response.elapsed > TEST_TIMEOUT {
        return Err(format!("Unexpected elapsed: {:?}", response.elapsed));
    }
    Ok(())
}

#[tokio::test]
async fn http_executor_returns_non_success_status_as_response() -> Result<(), String> {
    let (url, server) = spawn_http_server("503 Service Unavailable", "busy").await?;
    let executor =
        HttpExecutor::from_settings(&settings()).map_err(|err| format!("client: {}", err))?;

    let response = executor
        .execute(&url)
        .await
        .map_err(|err| format!("request failed: {}", err))?;
    join_server(server).await?;

    if response.status != 503 {
        return Err(format!("Unexpected status: {}", response.status));
    }
    Ok(())
}

#[tokio::test]
async fn http_executor_reports_refused_connection() -> Result<(), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("addr failed: {}", err))?;
    drop(listener);

    let executor =
        HttpExecutor::from_settings(&settings()).map_err(|err| format!("client: {}", err))?;
    match executor.execute(&format!("http://{}/", addr)).await {
        Ok(response) => Err(format!("Expected failure, got {:?}", response)),
        Err(err) if err.message().is_empty() => Err("Expected a description".to_owned()),
        Err(_) => Ok(()),
    }
}

#[test]
fn transport_error_displays_its_message() -> Result<(), String> {
    let err = TransportError::new("connection refused");
    if err.to_string() != "connection refused" || err.into_message() != "connection refused" {
        return Err("Unexpected transport error text".to_owned());
    }
    Ok(())
}
