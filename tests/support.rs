use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a lightweight HTTP server for tests. Paths starting with
/// `/status/500` answer 500, everything else answers 200.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    thread::spawn(move || handle_client(stream));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

/// Like [`spawn_http_server`], but returns `None` in sandboxes that forbid
/// binding sockets.
///
/// # Errors
///
/// Returns an error if the listener fails for any other reason.
pub fn spawn_http_server_or_skip() -> Result<Option<(String, ServerHandle)>, String> {
    match spawn_http_server() {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.contains("Operation not permitted") => {
            eprintln!("Skipping e2e test: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn handle_client(mut stream: TcpStream) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let mut buffer = [0u8; 1024];
    let Ok(read) = stream.read(&mut buffer) else {
        return;
    };
    let request = buffer.get(..read).unwrap_or_default();
    let response: &[u8] = if request.starts_with(b"GET /status/500") {
        b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\nFAIL"
    } else {
        b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK"
    };
    if stream.write_all(response).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// An address nothing listens on.
///
/// # Errors
///
/// Returns an error if the throwaway listener cannot be bound.
pub fn closed_port_url() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind throwaway listener failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("throwaway listener addr failed: {}", err))?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

/// Run the `vuload` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_vuload<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = vuload_bin()?;
    Command::new(bin)
        .args(args)
        .env("RUST_LOG", "error")
        .env_remove("VULOAD_LOG")
        .env_remove("NO_COLOR")
        .output()
        .map_err(|err| format!("run vuload failed: {}", err))
}

fn vuload_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_vuload").map_or_else(
        || Err("CARGO_BIN_EXE_vuload missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}

/// The single run log written into `dir`.
///
/// # Errors
///
/// Returns an error unless exactly one `loadtest_*.jsonl` file exists.
pub fn single_run_log(dir: &Path) -> Result<PathBuf, String> {
    let entries = std::fs::read_dir(dir)
        .map_err(|err| format!("read_dir {} failed: {}", dir.display(), err))?;
    let mut logs = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| format!("dir entry failed: {}", err))?
            .path();
        let is_run_log = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("loadtest_") && name.ends_with(".jsonl"));
        if is_run_log {
            logs.push(path);
        }
    }
    match logs.as_slice() {
        [single] => Ok(single.clone()),
        other => Err(format!("Expected one run log, found {:?}", other)),
    }
}

/// Every line of a run log as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is not JSON.
pub fn read_json_lines(path: &Path) -> Result<Vec<serde_json::Value>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("read {} failed: {}", path.display(), err))?;
    content
        .lines()
        .map(|line| {
            serde_json::from_str(line).map_err(|err| format!("invalid json line {}: {}", line, err))
        })
        .collect()
}
