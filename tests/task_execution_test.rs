//! Task execution tests against real child processes
//!
//! These run on Unix hosts where `true`, `false`, `echo` and `sh` are on PATH.
#![cfg(unix)]

use pretty_assertions::assert_eq;
use workerpool::pool::{PoolConfig, WorkerPool};
use workerpool::task::{execute_process, Task, TaskResult, EXEC_FAILURE_CODE};

fn find<'a>(results: &'a [TaskResult], id: &str) -> &'a TaskResult {
    results
        .iter()
        .find(|r| r.identifier == id)
        .unwrap_or_else(|| panic!("no result for {}", id))
}

#[tokio::test]
async fn test_true_and_false() {
    let tasks = vec![
        Task::new("a", "true", Vec::<String>::new()),
        Task::new("b", "false", Vec::<String>::new()),
    ];

    let results = WorkerPool::new(PoolConfig::new(2)).run(tasks).await;

    assert_eq!(results.len(), 2);
    assert_eq!(find(&results, "a").exit_code, 0);
    assert_eq!(find(&results, "b").exit_code, 1);
}

#[tokio::test]
async fn test_empty_batch() {
    let results = WorkerPool::default().run(Vec::new()).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_missing_binary_reports_failure() {
    let tasks = vec![Task::new("ghost", "no-such-binary-for-workerpool-tests", ["x"])];

    let results = WorkerPool::default().run(tasks).await;

    assert_eq!(results.len(), 1);
    assert_ne!(results[0].exit_code, 0);
    assert!(!results[0].result_body.is_empty());
}

// A task whose process cannot start still produces a result, so the result
// count always equals the task count.
#[tokio::test]
async fn test_start_failure_does_not_block_other_tasks() {
    let tasks = vec![
        Task::new("ghost", "no-such-binary-for-workerpool-tests", Vec::<String>::new()),
        Task::new("hello", "echo", ["hello"]),
        Task::new("ok", "true", Vec::<String>::new()),
    ];

    let results = WorkerPool::new(PoolConfig::new(2)).run(tasks).await;

    assert_eq!(results.len(), 3);
    assert_eq!(find(&results, "ghost").exit_code, EXEC_FAILURE_CODE);
    assert_eq!(find(&results, "hello").result_body, "hello\n");
    assert_eq!(find(&results, "ok").exit_code, 0);
}

#[tokio::test]
async fn test_exit_codes_are_preserved() {
    let tasks: Vec<Task> = [0, 1, 2, 42, 127, 255]
        .iter()
        .map(|code| Task::new(format!("exit {}", code), "sh", ["-c".to_string(), format!("exit {}", code)]))
        .collect();

    let results = WorkerPool::new(PoolConfig::new(3)).run(tasks).await;

    for code in [0, 1, 2, 42, 127, 255] {
        assert_eq!(find(&results, &format!("exit {}", code)).exit_code, code);
    }
}

#[tokio::test]
async fn test_stdout_captured_and_stderr_dropped() {
    let task = Task::new("mixed", "sh", ["-c", "echo out; echo err >&2; exit 3"]);

    let result = execute_process(&task).await;

    assert_eq!(result.exit_code, 3);
    assert_eq!(result.result_body, "out\n");
}

#[tokio::test]
async fn test_args_are_not_shell_interpreted() {
    let task = Task::new("literal", "echo", ["$HOME", "a b", "*"]);

    let result = execute_process(&task).await;

    assert_eq!(result.result_body, "$HOME a b *\n");
}

#[tokio::test]
async fn test_signal_termination_maps_to_128_plus_signal() {
    let task = Task::new("killed", "sh", ["-c", "kill -9 $$"]);

    let result = execute_process(&task).await;

    assert_eq!(result.exit_code, 128 + 9);
}

#[tokio::test]
async fn test_invalid_utf8_output_is_replaced() {
    let task = Task::new("bytes", "printf", ["\\377ok"]);

    let result = execute_process(&task).await;

    assert_eq!(result.exit_code, 0);
    assert!(result.result_body.ends_with("ok"));
}

#[tokio::test]
async fn test_sequential_and_parallel_runs_agree() {
    let tasks: Vec<Task> = (0..6)
        .map(|i| Task::new(format!("t{}", i), "sh", ["-c".to_string(), format!("echo {}; exit {}", i, i % 3)]))
        .collect();

    let mut sequential = WorkerPool::new(PoolConfig::new(1)).run(tasks.clone()).await;
    let mut parallel = WorkerPool::new(PoolConfig::new(4)).run(tasks).await;
    sequential.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    parallel.sort_by(|a, b| a.identifier.cmp(&b.identifier));

    assert_eq!(sequential, parallel);
}
