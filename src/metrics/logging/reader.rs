use std::path::Path;

use super::super::LogRecord;

/// Parses a run log back into records, one per line.
pub(crate) fn read_run_log(path: &Path) -> Result<Vec<LogRecord>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("read {} failed: {}", path.display(), err))?;
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str::<LogRecord>(line)
                .map_err(|err| format!("line {} is not a log record: {}", idx, err))
        })
        .collect()
}
