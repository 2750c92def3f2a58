use std::num::NonZeroUsize;

use crate::storage::Slab;

/// Runs a job once per worker over disjoint slabs.
///
/// A `Dispatcher` receives exactly one slab per worker and must not return
/// until every job has finished, so the caller can treat `dispatch` as a
/// barrier.
pub trait Dispatcher {
    /// The amount of workers this dispatcher runs.
    fn workers(&self) -> NonZeroUsize;

    /// Runs `job` once per slab.
    ///
    /// # Arguments
    /// * `slabs` - One slab per worker, indexed by worker id.
    /// * `job` - Called with the worker id, the amount of workers and the worker's slab.
    fn dispatch<'a, F>(&self, slabs: Vec<Slab<'a>>, job: F)
    where
        F: Fn(usize, usize, Slab<'a>) + Send + Sync;
}
