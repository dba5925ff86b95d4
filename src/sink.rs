//! Verdict reporting.
//!
//! The sink is an injected capability so the pool and pipeline stay testable
//! without a console; the production sink forwards to `tracing`, which gives
//! every line a timestamp and keeps concurrent writes line-atomic.

use crate::pipeline::Verdict;
use parking_lot::Mutex;
use tracing::info;

/// Shared, thread-safe consumer of `(exponent, verdict)` pairs.
pub trait VerdictSink: Send + Sync {
    fn report(&self, p: u64, verdict: Verdict);
}

/// Logs verdicts as human-readable lines.
#[derive(Debug, Default)]
pub struct LogSink;

impl VerdictSink for LogSink {
    fn report(&self, p: u64, verdict: Verdict) {
        if verdict.is_prime() {
            info!("Discovered Mersenne prime!! M{p}");
            info!("Remember to do a full candidacy check before announcing.");
        } else {
            info!("-- {p} is not prime ({verdict}).");
        }
    }
}

/// Accumulates verdicts in memory, for tests and embedders.
#[derive(Debug, Default)]
pub struct CollectingSink {
    verdicts: Mutex<Vec<(u64, Verdict)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<(u64, Verdict)> {
        self.verdicts.lock().clone()
    }
}

impl VerdictSink for CollectingSink {
    fn report(&self, p: u64, verdict: Verdict) {
        self.verdicts.lock().push((p, verdict));
    }
}
