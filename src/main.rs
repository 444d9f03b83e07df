//! workerpool - run a set of tasks in parallel and await the results
//!
//! Reads a JSON task list from the first argument or from `--infile`, runs
//! the tasks on a bounded worker pool and prints the JSON result list.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use workerpool::{
    io::{load_tasks, write_results},
    logging::init_tracing,
    metrics::write_metrics,
    pool::{PoolConfig, WorkerPool},
};

#[derive(Parser, Debug)]
#[command(name = "workerpool")]
#[command(about = "Run a set of tasks in parallel and await the results")]
#[command(version)]
struct Cli {
    /// JSON encoded list of tasks to execute. If omitted then --infile must be used
    tasks: Option<String>,

    /// Path to a file with the task definitions. Overrides the tasks argument
    #[arg(short, long)]
    infile: Option<PathBuf>,

    /// Path to the file which should receive the results instead of stdout
    #[arg(short, long)]
    outfile: Option<PathBuf>,

    /// Maximum number of tasks running in parallel (values below 1 mean 1)
    #[arg(
        short = 't',
        long,
        alias = "max_threads",
        env = "WORKERPOOL_MAX_THREADS",
        default_value_t = 2,
        allow_negative_numbers = true
    )]
    max_threads: i64,

    /// Print diagnostics to stderr. When disabled only the result JSON is output
    #[arg(short, long)]
    verbose: bool,

    /// Write Prometheus metrics to this file after the batch completes
    #[arg(long)]
    metrics_file: Option<PathBuf>,
}

impl Cli {
    fn pool_config(&self) -> PoolConfig {
        PoolConfig::default().with_max_threads(usize::try_from(self.max_threads).unwrap_or(0))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let tasks = load_tasks(cli.tasks.as_deref(), cli.infile.as_deref())
        .context("Unable to load tasks")?;

    let pool = WorkerPool::new(cli.pool_config());
    let report = pool.execute(tasks).await;

    write_results(&report.results, cli.outfile.as_deref()).context("Unable to output results")?;

    if let Some(path) = &cli.metrics_file {
        write_metrics(path).context("Unable to write metrics")?;
        info!(path = %path.display(), "Metrics written");
    }

    Ok(())
}
