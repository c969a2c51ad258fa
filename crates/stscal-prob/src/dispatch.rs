use num::rational::BigRational;
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::longest_run::{self, LongestRunError, TestConfiguration};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Longest-run error: {0}")]
    LongestRun(#[from] LongestRunError),
    #[error("Worker count must be at least 1")]
    ZeroWorkers,
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Cumulative probabilities must be non-decreasing (violated at boundary index {index})")]
    NonMonotonicCumulative { index: usize },
}

/// One independent class evaluation: a (M, m) pair.
///
/// Items for the same configuration share nothing, which is what licenses
/// running them in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    /// Block length M in bits.
    pub block_len: u64,
    /// Class boundary m.
    pub boundary: u64,
}

/// Fan independent evaluations out over a bounded worker pool and collect
/// the results in submission order.
///
/// The pool size is a caller-supplied constant, never derived from the item
/// count: per-class cost is uneven but predictable, so static one-item-per-
/// worker submission is enough and no work stealing is needed. The first
/// `Err` aborts the whole batch (partial results are useless downstream),
/// and a worker panic propagates to the caller.
pub fn map_ordered<I, T, F>(items: Vec<I>, workers: usize, eval: F) -> Result<Vec<T>, DispatchError>
where
    I: Send,
    T: Send,
    F: Fn(I) -> Result<T, DispatchError> + Sync,
{
    if workers == 0 {
        return Err(DispatchError::ZeroWorkers);
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;
    pool.install(|| items.into_par_iter().map(|item| eval(item)).collect())
}

/// Evaluate the cumulative probability for every class boundary of a
/// configuration, in boundary order.
///
/// Validates the configuration before spawning anything, and checks the
/// monotonicity the differencing pass depends on after collecting.
pub fn class_probabilities(
    config: &TestConfiguration,
    workers: usize,
) -> Result<Vec<BigRational>, DispatchError> {
    config.validate()?;
    let items: Vec<WorkItem> = config
        .boundaries
        .iter()
        .map(|&boundary| WorkItem {
            block_len: config.block_len,
            boundary,
        })
        .collect();

    let cumulative = map_ordered(items, workers, |item| {
        let p = longest_run::cumulative_probability(item.block_len, item.boundary);
        debug!(
            block_len = item.block_len,
            boundary = item.boundary,
            "class boundary evaluated"
        );
        Ok(p)
    })?;

    for (index, pair) in cumulative.windows(2).enumerate() {
        if pair[1] < pair[0] {
            return Err(DispatchError::NonMonotonicCumulative { index: index + 1 });
        }
    }
    Ok(cumulative)
}

/// End-to-end derivation of the per-class probability masses for one
/// configuration: parallel dispatch followed by the differencing pass.
pub fn derive_masses(
    config: &TestConfiguration,
    workers: usize,
) -> Result<Vec<BigRational>, DispatchError> {
    let cumulative = class_probabilities(config, workers)?;
    Ok(longest_run::probability_masses(&cumulative))
}
