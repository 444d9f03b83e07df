//! Process executor: runs one task as a child process and captures its outcome.
//!
//! The executor never fails. Anything that goes wrong while starting the
//! process or reading its output becomes a [`TaskResult`] with a non-zero
//! exit code and a readable body, so one broken task cannot abort a batch.

use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, instrument, warn};

use crate::task::{Task, TaskResult};

/// Exit code reported when a task could not be executed or its status
/// could not be determined
pub const EXEC_FAILURE_CODE: i32 = 1;

/// Something that turns a [`Task`] into a [`TaskResult`].
///
/// Workers only talk to this trait, which keeps the pool independent of how
/// tasks actually run.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Run one task to completion and report its outcome
    async fn run(&self, task: &Task) -> TaskResult;
}

/// Runs tasks as child processes of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new process runner
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TaskRunner for ProcessRunner {
    async fn run(&self, task: &Task) -> TaskResult {
        execute_process(task).await
    }
}

/// Run `task.command` with `task.args`, capturing stdout in full.
///
/// stdin is closed and stderr is discarded. If the process cannot be started
/// or its output cannot be read, the child is killed and a failure result
/// with [`EXEC_FAILURE_CODE`] is returned.
#[instrument(skip(task), fields(task_id = %task.identifier))]
pub async fn execute_process(task: &Task) -> TaskResult {
    let mut command = Command::new(&task.command);
    command
        .args(&task.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(
                task_id = %task.identifier,
                command = %task.display_command(),
                error = %e,
                "Unable to start task"
            );
            return TaskResult::failure(
                &task.identifier,
                EXEC_FAILURE_CODE,
                format!("Unable to start \"{}\". Error was: {}", task.display_command(), e),
            );
        }
    };

    let Some(stdout) = child.stdout.take() else {
        warn!(task_id = %task.identifier, "Unable to open stdout pipe");
        reap(&mut child).await;
        return TaskResult::failure(
            &task.identifier,
            EXEC_FAILURE_CODE,
            format!("Unable to open stdout pipe for {}", task.identifier),
        );
    };

    let output = match read_output(task, &mut child, stdout).await {
        Ok(output) => output,
        Err(failure) => return failure,
    };

    match child.wait().await {
        Ok(status) => {
            let exit_code = exit_code_from_status(&status);
            if exit_code != 0 {
                debug!(task_id = %task.identifier, exit_code, "Task exited with non-zero status");
            }
            TaskResult::completed(&task.identifier, exit_code, output)
        }
        Err(e) => {
            warn!(task_id = %task.identifier, error = %e, "Unable to wait for task");
            TaskResult::completed(&task.identifier, EXEC_FAILURE_CODE, output)
        }
    }
}

/// Map a process termination status to a numeric exit code.
///
/// Normal exits report their status. On Unix a signal termination reports
/// `128 + signal`, the shell convention. Anything else falls back to
/// [`EXEC_FAILURE_CODE`].
pub fn exit_code_from_status(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    warn!(status = %status, "Unable to extract exit code from process status");
    EXEC_FAILURE_CODE
}

/// Read `stdout` to the end and decode it, replacing invalid UTF-8.
///
/// On a read error the reader is dropped, `child` is killed and reaped, and
/// the failure result is returned as the error.
async fn read_output<R>(task: &Task, child: &mut Child, mut stdout: R) -> Result<String, TaskResult>
where
    R: AsyncRead + Unpin,
{
    let mut captured = Vec::new();
    if let Err(e) = stdout.read_to_end(&mut captured).await {
        warn!(task_id = %task.identifier, error = %e, "Unable to read task output");
        drop(stdout);
        reap(child).await;
        return Err(TaskResult::failure(
            &task.identifier,
            EXEC_FAILURE_CODE,
            format!("Unable to read result body for {}. Error was: {}", task.identifier, e),
        ));
    }

    Ok(String::from_utf8_lossy(&captured).into_owned())
}

async fn reap(child: &mut Child) {
    if let Err(e) = child.kill().await {
        debug!(error = %e, "Unable to kill child process");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn test_exit_code_normal() {
        assert_eq!(exit_code_from_status(&ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code_from_status(&ExitStatus::from_raw(3 << 8)), 3);
    }

    #[test]
    fn test_exit_code_signal() {
        // SIGKILL
        assert_eq!(exit_code_from_status(&ExitStatus::from_raw(9)), 137);
    }

    #[tokio::test]
    async fn test_execute_echo() {
        let result = execute_process(&Task::new("echo", "echo", ["hello", "world"])).await;
        assert_eq!(result.identifier, "echo");
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.result_body, "hello world\n");
    }

    #[tokio::test]
    async fn test_execute_missing_binary() {
        let result = execute_process(&Task::new("ghost", "definitely-not-a-real-binary-9f3a", Vec::<String>::new())).await;
        assert_eq!(result.exit_code, EXEC_FAILURE_CODE);
        assert!(result.result_body.contains("Unable to start"));
    }

    #[tokio::test]
    async fn test_read_failure_kills_child() {
        let task = Task::new("stuck", "sleep", ["5"]);
        let mut child = Command::new("sleep")
            .arg("5")
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let broken = tokio_test::io::Builder::new()
            .read_error(std::io::Error::new(std::io::ErrorKind::Other, "pipe broke"))
            .build();

        let failure = read_output(&task, &mut child, broken).await.unwrap_err();
        assert_eq!(failure.identifier, "stuck");
        assert_eq!(failure.exit_code, EXEC_FAILURE_CODE);
        assert!(failure.result_body.contains("pipe broke"));

        // killed and reaped, not left running
        assert!(child.try_wait().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_read_output_lossy() {
        let task = Task::new("bytes", "true", Vec::<String>::new());
        let mut child = Command::new("true").stdout(Stdio::null()).spawn().unwrap();
        let reader = tokio_test::io::Builder::new().read(b"ok \xff\n").build();

        let output = read_output(&task, &mut child, reader).await.unwrap();
        assert_eq!(output, "ok \u{fffd}\n");
        child.wait().await.unwrap();
    }
}
