pub use crate::arith::{Arithmetic, BigIntBackend};
pub use crate::cancel::CancelToken;
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::pipeline::{Pipeline, Verdict};
pub use crate::pool::SearchPool;
pub use crate::sink::{CollectingSink, LogSink, VerdictSink};
pub use crate::source::CandidateSource;
