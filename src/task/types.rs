//! Task and result records exchanged between the pool and its callers.

use serde::{Deserialize, Deserializer, Serialize};

/// A single external command to execute.
///
/// Tasks are immutable once built. The identifier is only used to correlate
/// a [`TaskResult`] with the task it came from; uniqueness is not checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Caller supplied correlation identifier
    #[serde(default, alias = "Identifier")]
    pub identifier: String,
    /// Executable to run, resolved through `PATH` when not a path
    #[serde(alias = "Command")]
    pub command: String,
    /// Argument vector passed to the executable, no shell interpretation
    #[serde(default, alias = "Args", deserialize_with = "null_as_empty")]
    pub args: Vec<String>,
}

impl Task {
    /// Create a task from an identifier, a command and its arguments
    pub fn new<I, S>(identifier: impl Into<String>, command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifier: identifier.into(),
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Command line as it would be typed, for diagnostics only
    pub fn display_command(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Outcome of one task.
///
/// `result_body` carries the captured standard output when the process ran,
/// or a readable error description when it could not be run or read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Identifier copied from the originating task
    pub identifier: String,
    /// OS exit status of the child process, 0 on success
    pub exit_code: i32,
    /// Captured stdout or an error description
    pub result_body: String,
}

impl TaskResult {
    /// Result for a process that ran to completion
    pub fn completed(identifier: impl Into<String>, exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            exit_code,
            result_body: output.into(),
        }
    }

    /// Result for a task that could not be executed
    pub fn failure(identifier: impl Into<String>, exit_code: i32, message: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            exit_code,
            result_body: message.into(),
        }
    }

    /// Whether the process exited with status 0
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Accept `null` wherever a list is expected and read it as empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
