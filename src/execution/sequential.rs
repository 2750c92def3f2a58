use std::num::NonZeroUsize;

use super::Dispatcher;
use crate::storage::Slab;

/// Runs every job on the calling thread, in worker id order.
#[derive(Debug, Clone, Copy)]
pub struct SequentialDispatcher {
    workers: NonZeroUsize,
}

impl SequentialDispatcher {
    /// Creates a new `SequentialDispatcher`.
    ///
    /// # Arguments
    /// * `workers` - The amount of logical workers to emulate.
    pub fn new(workers: NonZeroUsize) -> Self {
        Self { workers }
    }
}

impl Default for SequentialDispatcher {
    fn default() -> Self {
        Self::new(NonZeroUsize::MIN)
    }
}

impl Dispatcher for SequentialDispatcher {
    fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    fn dispatch<'a, F>(&self, slabs: Vec<Slab<'a>>, job: F)
    where
        F: Fn(usize, usize, Slab<'a>) + Send + Sync,
    {
        let workers = slabs.len();

        slabs
            .into_iter()
            .enumerate()
            .for_each(|(id, slab)| job(id, workers, slab));
    }
}
