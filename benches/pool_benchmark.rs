use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;
use workerpool::pool::{PoolConfig, WorkerPool};
use workerpool::task::{Task, TaskResult, TaskRunner};

/// Runner with no process overhead, so only pool coordination is measured
struct NoopRunner;

#[async_trait]
impl TaskRunner for NoopRunner {
    async fn run(&self, task: &Task) -> TaskResult {
        TaskResult::completed(&task.identifier, 0, "")
    }
}

fn create_tasks(count: usize) -> Vec<Task> {
    (0..count)
        .map(|i| Task::new(format!("task_{}", i), "noop", Vec::<String>::new()))
        .collect()
}

fn benchmark_pool_coordination(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("pool_coordination");

    for workers in [1, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            let pool = WorkerPool::new(PoolConfig::new(workers)).with_runner(Arc::new(NoopRunner));
            b.iter(|| rt.block_on(async { black_box(pool.run(create_tasks(1_000)).await) }));
        });
    }

    group.finish();
}

#[cfg(unix)]
fn benchmark_process_execution(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let pool = WorkerPool::new(PoolConfig::new(4));

    c.bench_function("process_execution_16_true", |b| {
        b.iter(|| {
            let tasks = (0..16)
                .map(|i| Task::new(format!("true_{}", i), "true", Vec::<String>::new()))
                .collect();
            rt.block_on(async { black_box(pool.run(tasks).await) })
        });
    });
}

#[cfg(not(unix))]
fn benchmark_process_execution(_c: &mut Criterion) {}

criterion_group!(benches, benchmark_pool_coordination, benchmark_process_execution);
criterion_main!(benches);
