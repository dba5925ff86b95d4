//! Worker pool and generator loop.
//!
//! One producer feeds ascending exponents through the bounded queue; each
//! worker repeatedly dequeues a candidate, runs the pipeline, and reports
//! the verdict. Verdicts may surface out of numeric order; admission order
//! at the queue boundary is still FIFO.

use crate::arith::Arithmetic;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::queue::TaskQueue;
use crate::sink::VerdictSink;
use crate::source::CandidateSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Counters shared by all workers.
#[derive(Debug, Default)]
pub struct PoolStats {
    candidates_checked: AtomicU64,
    primes_found: AtomicU64,
}

impl PoolStats {
    pub fn candidates_checked(&self) -> u64 {
        self.candidates_checked.load(Ordering::Relaxed)
    }

    pub fn primes_found(&self) -> u64 {
        self.primes_found.load(Ordering::Relaxed)
    }
}

struct WorkerHandle {
    id: usize,
    thread: Option<JoinHandle<()>>,
}

/// Fixed pool of worker threads draining the candidate queue.
pub struct SearchPool {
    workers: Vec<WorkerHandle>,
    queue: Arc<TaskQueue<u64>>,
    cancel: CancelToken,
    stats: Arc<PoolStats>,
}

impl SearchPool {
    /// Spawn the configured number of workers against a fresh queue.
    pub fn start<A>(config: &Config, arith: A, sink: Arc<dyn VerdictSink>) -> Result<Self>
    where
        A: Arithmetic + Clone + Send + 'static,
    {
        config.validate()?;

        let queue = Arc::new(TaskQueue::new(config.queue_capacity));
        let cancel = CancelToken::new();
        let stats = Arc::new(PoolStats::default());

        let num_workers = config.worker_threads();
        let mut workers = Vec::with_capacity(num_workers);

        for id in 0..num_workers {
            let pipeline = Pipeline::new(arith.clone(), config.mr_rounds);
            let queue_clone = queue.clone();
            let cancel_clone = cancel.clone();
            let sink_clone = sink.clone();
            let stats_clone = stats.clone();
            let name = format!("{}-{}", config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let thread = match builder.spawn(move || {
                worker_loop(id, pipeline, queue_clone, cancel_clone, sink_clone, stats_clone)
            }) {
                Ok(thread) => thread,
                Err(e) => {
                    // release the workers that did start
                    cancel.cancel();
                    queue.close();
                    return Err(Error::pool(format!("spawn failed: {e}")));
                }
            };

            workers.push(WorkerHandle {
                id,
                thread: Some(thread),
            });
        }

        info!(
            workers = num_workers,
            capacity = config.queue_capacity,
            "search pool started"
        );

        Ok(Self {
            workers,
            queue,
            cancel,
            stats,
        })
    }

    /// Offer one candidate, blocking under back-pressure.
    ///
    /// Returns `false` if the pool is shutting down.
    pub fn enqueue(&self, p: u64) -> bool {
        self.queue.push(p)
    }

    /// Generator loop: drain `source` into the queue on the calling thread.
    ///
    /// With an unbounded source this never returns; the queue suspends the
    /// caller whenever it is full so the generator cannot outrun the
    /// slowest worker by more than the queue capacity.
    pub fn run<S: CandidateSource>(&self, mut source: S) {
        while let Some(p) = source.next_candidate() {
            if !self.queue.push(p) {
                break;
            }
        }
    }

    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Graceful stop: refuse new candidates, let workers finish everything
    /// already queued, then join them.
    pub fn join(mut self) {
        self.queue.close();
        self.join_workers();
    }

    /// Fast stop: abandon in-flight checks and join.
    pub fn shutdown(mut self) {
        self.cancel.cancel();
        self.queue.close();
        self.join_workers();
    }

    fn join_workers(&mut self) {
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    warn!(worker = worker.id, "worker panicked");
                }
            }
        }
    }
}

impl std::fmt::Debug for SearchPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPool")
            .field("workers", &self.workers.len())
            .field("queue", &self.queue)
            .finish()
    }
}

impl Drop for SearchPool {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.queue.close();
        self.join_workers();
    }
}

fn worker_loop<A: Arithmetic>(
    id: usize,
    pipeline: Pipeline<A>,
    queue: Arc<TaskQueue<u64>>,
    cancel: CancelToken,
    sink: Arc<dyn VerdictSink>,
    stats: Arc<PoolStats>,
) {
    debug!(worker = id, "worker started");

    while let Some(p) = queue.pop() {
        match pipeline.check_with_cancel(p, &cancel) {
            Some(verdict) => {
                stats.candidates_checked.fetch_add(1, Ordering::Relaxed);
                if verdict.is_prime() {
                    stats.primes_found.fetch_add(1, Ordering::Relaxed);
                }
                sink.report(p, verdict);
            }
            // cancelled mid-check
            None => break,
        }
    }

    debug!(worker = id, "worker stopped");
}
