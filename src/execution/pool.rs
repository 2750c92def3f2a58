use std::num::NonZeroUsize;

use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};

use super::Dispatcher;
use crate::{error::Result, storage::Slab};

/// Runs the jobs on a dedicated rayon pool with one thread per worker.
#[derive(Debug)]
pub struct PoolDispatcher {
    pool: ThreadPool,
    workers: NonZeroUsize,
}

impl PoolDispatcher {
    /// Creates a new `PoolDispatcher`.
    ///
    /// # Arguments
    /// * `workers` - The amount of threads of the pool.
    ///
    /// # Returns
    /// A new dispatcher or a `ThreadPool` error if the threads couldn't be spawned.
    pub fn new(workers: NonZeroUsize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|id| format!("rprop-worker-{id}"))
            .build()?;

        debug!(workers = workers.get(); "update pool ready");
        Ok(Self { pool, workers })
    }
}

impl Dispatcher for PoolDispatcher {
    fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    fn dispatch<'a, F>(&self, slabs: Vec<Slab<'a>>, job: F)
    where
        F: Fn(usize, usize, Slab<'a>) + Send + Sync,
    {
        let workers = slabs.len();

        self.pool.install(|| {
            slabs
                .into_par_iter()
                .enumerate()
                .for_each(|(id, slab)| job(id, workers, slab));
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{Arc, Mutex},
    };

    use super::*;
    use crate::storage::OptimizerState;

    #[test]
    fn every_worker_runs_once_on_its_own_slab() {
        const FEATURES: usize = 103;
        const WORKERS: usize = 4;

        let workers = NonZeroUsize::new(WORKERS).unwrap();
        let dispatcher = PoolDispatcher::new(workers).unwrap();

        let mut state = OptimizerState::new(FEATURES).unwrap();
        let mut weights = vec![0.; FEATURES];
        let mut grad = vec![0.; FEATURES];
        let seen = Arc::new(Mutex::new(HashSet::new()));

        let slabs = state
            .slab(&mut weights, &mut grad)
            .unwrap()
            .partition(workers);

        dispatcher.dispatch(slabs, |id, count, slab| {
            assert_eq!(count, WORKERS);
            assert!(seen.lock().unwrap().insert(id));
            slab.weights.iter_mut().for_each(|w| *w = id as f64);
        });

        assert_eq!(seen.lock().unwrap().len(), WORKERS);
        for (id, range) in crate::execution::partition::ranges(FEATURES, workers).enumerate() {
            assert!(weights[range].iter().all(|&w| w == id as f64));
        }
    }

    #[test]
    fn jobs_run_on_pool_threads() {
        let workers = NonZeroUsize::new(2).unwrap();
        let dispatcher = PoolDispatcher::new(workers).unwrap();

        let mut state = OptimizerState::new(8).unwrap();
        let mut weights = vec![0.; 8];
        let mut grad = vec![0.; 8];
        let slabs = state
            .slab(&mut weights, &mut grad)
            .unwrap()
            .partition(workers);

        let names = Mutex::new(Vec::new());
        dispatcher.dispatch(slabs, |_, _, _| {
            let name = std::thread::current().name().map(str::to_owned);
            names.lock().unwrap().push(name);
        });

        let names = names.into_inner().unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|name| {
            name.as_deref()
                .is_some_and(|name| name.starts_with("rprop-worker-"))
        }));
    }
}
