//! Thread pool configuration for parallel record reads
//!
//! [`Hypercube::par_records`](crate::hypercube::Hypercube::par_records) runs
//! on rayon's global pool; this sets that pool up once per process.

use crate::errors::{NcSchemaError, Result};
use rayon::ThreadPoolBuilder;
use tracing::info;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    #[must_use]
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Use all available CPU cores
    #[must_use]
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    #[must_use]
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Set up the global rayon thread pool with this configuration
    ///
    /// # Errors
    ///
    /// Returns [`NcSchemaError::ThreadPoolError`] if the thread count is zero
    /// or the global pool was already initialized.
    pub fn setup_global_pool(&self) -> Result<()> {
        match self.num_threads {
            Some(0) => Err(NcSchemaError::ThreadPoolError(
                "Thread count must be at least 1".to_string(),
            )),
            Some(num_threads) => {
                ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build_global()
                    .map_err(|e| {
                        NcSchemaError::ThreadPoolError(format!(
                            "Failed to initialize thread pool with {num_threads} threads: {e}"
                        ))
                    })?;
                info!("Configured parallel reads with {} threads", num_threads);
                Ok(())
            }
            None => {
                info!(
                    "Using default thread pool configuration ({} threads)",
                    rayon::current_num_threads()
                );
                Ok(())
            }
        }
    }

    /// Number of threads in the current pool
    #[must_use]
    pub fn current_threads(&self) -> usize {
        rayon::current_num_threads()
    }
}
