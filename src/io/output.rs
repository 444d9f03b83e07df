//! Writing result lists as JSON.

use std::io::Write;
use std::path::Path;

use crate::task::TaskResult;
use crate::{Result, WorkerPoolError};

/// Encode results as a single line of JSON
pub fn encode_results(results: &[TaskResult]) -> Result<String> {
    serde_json::to_string(results).map_err(WorkerPoolError::Serialization)
}

/// Write encoded results to `outfile`, or to stdout followed by a newline
pub fn write_results(results: &[TaskResult], outfile: Option<&Path>) -> Result<()> {
    let json = encode_results(results)?;

    match outfile {
        Some(path) => std::fs::write(path, json).map_err(|source| WorkerPoolError::OutputWrite {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", json)
                .and_then(|_| handle.flush())
                .map_err(|source| WorkerPoolError::OutputWrite {
                    path: "-".into(),
                    source,
                })
        }
    }
}
