//! Common utilities used across the crate.

use std::num::NonZeroUsize;

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

// =============================================================================
// Parallelism Configuration
// =============================================================================

/// Whether parallel execution is allowed.
///
/// Passed down to batch evaluation. When `Parallel`, rows may be processed on
/// the current `rayon` pool; when `Sequential`, everything runs on the calling
/// thread. Pools themselves are built by [`thread_pool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Parallelism {
    #[default]
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Create from thread count semantics.
    ///
    /// - 0 = auto (parallel if rayon pool has multiple threads, sequential otherwise)
    /// - 1 = sequential
    /// - >1 = parallel
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    /// Like [`from_threads`](Self::from_threads), with `None` meaning auto.
    #[inline]
    pub fn from_n_threads(n_threads: Option<NonZeroUsize>) -> Self {
        Self::from_threads(n_threads.map_or(0, NonZeroUsize::get))
    }

    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }
}

// =============================================================================
// Thread Pools
// =============================================================================

/// Build a dedicated pool for an explicit thread count.
///
/// Returns `None` when no pool is needed: `None` keeps the ambient rayon pool
/// and `1` runs on the calling thread. Anything larger gets a pool of exactly
/// that many threads, meant to be built once and reused through
/// [`ThreadPool::install`].
pub fn thread_pool(
    n_threads: Option<NonZeroUsize>,
) -> Result<Option<ThreadPool>, ThreadPoolBuildError> {
    match n_threads.map(NonZeroUsize::get) {
        Some(n) if n > 1 => ThreadPoolBuilder::new().num_threads(n).build().map(Some),
        _ => Ok(None),
    }
}
