use crate::error::{Error, Result};

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 8;

/// Default capacity of the candidate queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default Miller-Rabin round count for the probabilistic filters.
pub const DEFAULT_MR_ROUNDS: u32 = 25;

#[derive(Debug, Clone)]
pub struct Config {
    pub num_workers: Option<usize>,
    pub queue_capacity: usize,
    pub mr_rounds: u32,
    pub stack_size: Option<usize>,
    pub thread_name_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_workers: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            mr_rounds: DEFAULT_MR_ROUNDS,
            stack_size: Some(2 * 1024 * 1024),
            thread_name_prefix: "lehmer-worker".to_string(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.num_workers {
            if n == 0 {
                return Err(Error::config("num_workers must be > 0"));
            }
            if n > 1024 {
                return Err(Error::config("num_workers too large (max 1024)"));
            }
        }

        if self.queue_capacity == 0 {
            return Err(Error::config("queue_capacity must be > 0"));
        }

        if self.mr_rounds == 0 {
            return Err(Error::config("mr_rounds must be > 0"));
        }

        Ok(())
    }

    pub fn worker_threads(&self) -> usize {
        self.num_workers.unwrap_or(DEFAULT_WORKERS)
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.config.num_workers = Some(n);
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn mr_rounds(mut self, rounds: u32) -> Self {
        self.config.mr_rounds = rounds;
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.worker_threads(), DEFAULT_WORKERS);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.mr_rounds, DEFAULT_MR_ROUNDS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .num_workers(4)
            .queue_capacity(16)
            .mr_rounds(10)
            .thread_name_prefix("test")
            .build()
            .unwrap();

        assert_eq!(config.worker_threads(), 4);
        assert_eq!(config.queue_capacity, 16);
        assert_eq!(config.mr_rounds, 10);
        assert_eq!(config.thread_name_prefix, "test");
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(Config::builder().num_workers(0).build().is_err());
        assert!(Config::builder().queue_capacity(0).build().is_err());
        assert!(Config::builder().mr_rounds(0).build().is_err());
    }
}
