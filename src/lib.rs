//! LEHMER - parallel Mersenne prime search
//!
//! A single generator enumerates candidate exponents into a bounded queue;
//! a fixed pool of workers drains it, running a staged primality test for
//! `M_p = 2^p - 1`: cheap elimination filters first, the deterministic
//! Lucas-Lehmer test only for survivors.
//!
//! # Quick Start
//!
//! ```no_run
//! use lehmer::prelude::*;
//! use std::sync::Arc;
//!
//! let config = Config::builder().num_workers(4).build().unwrap();
//! let pool = SearchPool::start(&config, BigIntBackend, Arc::new(LogSink)).unwrap();
//!
//! // runs forever; use a finite range (e.g. `2..200`) to stop
//! pool.run(1u64..);
//! ```
//!
//! # Features
//!
//! - **Bounded hand-off**: back-pressure keeps the generator at most one
//!   queue-capacity ahead of the slowest worker
//! - **Staged pipeline**: exponent filter, algebraic 2p+1 filter, and a
//!   trial-division sieve eliminate most composites before Lucas-Lehmer
//! - **Pluggable arithmetic**: the big-integer backend is a trait, so the
//!   control logic tests run without arbitrary precision
//! - **Cooperative cancellation**: long Lucas-Lehmer runs stop at the next
//!   iteration on shutdown

#![warn(missing_debug_implementations)]

pub mod arith;
pub mod cancel;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod sink;
pub mod source;

pub use arith::{Arithmetic, BigIntBackend};
pub use cancel::CancelToken;
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, Verdict};
pub use pool::SearchPool;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;
    use std::sync::Arc;

    #[test]
    fn test_end_to_end_small_search() {
        let config = Config::builder()
            .num_workers(2)
            .queue_capacity(8)
            .build()
            .unwrap();

        let sink = Arc::new(CollectingSink::new());
        let pool = SearchPool::start(&config, BigIntBackend, sink.clone()).unwrap();
        pool.run(1..20u64);
        pool.join();

        let mut primes: Vec<u64> = sink
            .snapshot()
            .into_iter()
            .filter(|(_, v)| v.is_prime())
            .map(|(p, _)| p)
            .collect();
        primes.sort_unstable();

        assert_eq!(primes, vec![2, 3, 5, 7, 13, 17, 19]);
    }
}
