use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::error::PipelineError;

use super::{DrainOutput, DrainReport};

/// Sole writer of the run log. Exits once the queue is closed and empty.
///
/// The close signal (or the pipeline being dropped) closes the receiving
/// half: later sends fail, while records already queued are still delivered.
pub(crate) async fn drain_records<T: Serialize>(
    mut writer: BufWriter<File>,
    mut receiver: mpsc::Receiver<T>,
    mut close_rx: oneshot::Receiver<()>,
) -> DrainOutput {
    let mut report = DrainReport::default();
    let mut line: Vec<u8> = Vec::with_capacity(512);
    let mut closing = false;

    loop {
        let next = tokio::select! {
            record = receiver.recv() => record,
            _ = &mut close_rx, if !closing => {
                closing = true;
                receiver.close();
                continue;
            }
        };
        let Some(record) = next else {
            break;
        };

        line.clear();
        match serde_json::to_writer(&mut line, &record) {
            Ok(()) => {
                line.push(b'\n');
                writer
                    .write_all(&line)
                    .await
                    .map_err(|err| PipelineError::Io {
                        context: "write run log",
                        source: err,
                    })?;
                report.written = report.written.saturating_add(1);
            }
            Err(err) => {
                warn!("Dropping run log record that failed to encode: {}", err);
                report.dropped = report.dropped.saturating_add(1);
            }
        }

        if receiver.is_empty() {
            writer.flush().await.map_err(|err| PipelineError::Io {
                context: "flush run log",
                source: err,
            })?;
        }
    }

    writer.flush().await.map_err(|err| PipelineError::Io {
        context: "flush run log",
        source: err,
    })?;
    Ok((writer, report))
}
