//! Loading task lists from inline JSON or files.

use std::path::Path;

use tracing::debug;

use crate::task::Task;
use crate::{Result, WorkerPoolError};

/// Parse a JSON task list.
///
/// A top-level `null` is read as an empty list.
pub fn parse_tasks(json: &str) -> Result<Vec<Task>> {
    let tasks: Option<Vec<Task>> = serde_json::from_str(json).map_err(WorkerPoolError::InputParse)?;
    Ok(tasks.unwrap_or_default())
}

/// Read and parse a JSON task list from a file
pub fn read_tasks_file(path: &Path) -> Result<Vec<Task>> {
    debug!(path = %path.display(), "Getting tasks from file");
    let contents = std::fs::read_to_string(path).map_err(|source| WorkerPoolError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tasks(&contents)
}

/// Load tasks from an input file or an inline JSON argument.
///
/// The file wins when both are given. Empty inline text counts as absent.
pub fn load_tasks(inline: Option<&str>, infile: Option<&Path>) -> Result<Vec<Task>> {
    match (infile, inline.filter(|s| !s.is_empty())) {
        (Some(path), _) => read_tasks_file(path),
        (None, Some(json)) => parse_tasks(json),
        (None, None) => Err(WorkerPoolError::MissingInput),
    }
}
