use anyhow::Result;
use clap::Parser;
use lehmer::sink::LogSink;
use lehmer::{BigIntBackend, Config, SearchPool};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Search for Mersenne primes, one exponent at a time.
#[derive(Debug, Parser)]
#[command(name = "lehmer", version, about)]
struct Args {
    /// Starting exponent; unparsable values fall back to the default
    start: Option<String>,

    /// Number of worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Candidate queue capacity
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Miller-Rabin rounds for the probabilistic filters
    #[arg(long)]
    mr_rounds: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // absent or unparsable both mean "start from 1"
    let start: u64 = args
        .start
        .as_deref()
        .map(|s| s.parse().unwrap_or(1))
        .unwrap_or(1);

    let mut builder = Config::builder();
    if let Some(workers) = args.workers {
        builder = builder.num_workers(workers);
    }
    if let Some(capacity) = args.queue_capacity {
        builder = builder.queue_capacity(capacity);
    }
    if let Some(rounds) = args.mr_rounds {
        builder = builder.mr_rounds(rounds);
    }
    let config = builder.build()?;

    let pool = SearchPool::start(&config, BigIntBackend, Arc::new(LogSink))?;
    info!(start, "starting Mersenne search");

    // never returns; the process runs until externally terminated
    pool.run(start..);
    pool.join();

    Ok(())
}
