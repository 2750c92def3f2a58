use log::{Level, debug, info, log_enabled, warn};

use super::{GradientSource, Outcome, Progress, Status, StopToken, Verdict};
use crate::{
    config::TrainingConfig,
    error::{Result, RpropErr},
    execution::{Dispatcher, PoolDispatcher},
    optimization::Rprop,
    storage::{GradientBuffers, OptimizerState},
};

/// Drives the gradient / update iterations of a training run.
///
/// Every iteration asks the gradient source for the objective and its
/// gradient, splits the features into one contiguous slab per worker and
/// updates them in parallel, then reports the objective to the progress
/// callback. The update phase always finishes before anything else happens.
#[derive(Debug)]
pub struct Trainer<D: Dispatcher = PoolDispatcher> {
    max_iterations: usize,
    rprop: Rprop,
    state: OptimizerState,
    buffers: GradientBuffers,
    dispatcher: D,
}

impl Trainer<PoolDispatcher> {
    /// Creates a new `Trainer` that updates on a dedicated thread pool.
    ///
    /// # Arguments
    /// * `features` - The amount of features of the model.
    /// * `config` - The training configuration.
    ///
    /// # Returns
    /// A new trainer, or an error if the configuration is invalid, the pool
    /// can't be spawned or the state can't be allocated.
    pub fn new(features: usize, config: &TrainingConfig) -> Result<Self> {
        config.validate()?;
        let dispatcher = PoolDispatcher::new(config.workers)?;
        Self::assemble(features, config, dispatcher)
    }
}

impl<D: Dispatcher> Trainer<D> {
    /// Creates a new `Trainer` with a custom dispatcher.
    ///
    /// # Arguments
    /// * `features` - The amount of features of the model.
    /// * `config` - The training configuration, `workers` must match the dispatcher's.
    /// * `dispatcher` - Runs the per-worker updates.
    pub fn with_dispatcher(features: usize, config: &TrainingConfig, dispatcher: D) -> Result<Self> {
        config.validate()?;

        if dispatcher.workers() != config.workers {
            return Err(RpropErr::InvalidConfig(format!(
                "the dispatcher runs {} workers but {} were configured",
                dispatcher.workers(),
                config.workers
            )));
        }

        Self::assemble(features, config, dispatcher)
    }

    /// Allocates the state for an already validated configuration.
    fn assemble(features: usize, config: &TrainingConfig, dispatcher: D) -> Result<Self> {
        Ok(Self {
            max_iterations: config.max_iterations,
            rprop: Rprop::new(&config.rprop),
            state: OptimizerState::new(features)?,
            buffers: GradientBuffers::new(features, config.workers)?,
            dispatcher,
        })
    }

    /// The optimizer state, as left by the last run.
    pub fn state(&self) -> &OptimizerState {
        &self.state
    }

    /// The gradient buffers, the primary one holds the last gradient after its update.
    pub fn buffers(&self) -> &GradientBuffers {
        &self.buffers
    }

    /// Trains `weights` until the progress callback ends the run, a stop is
    /// requested or the iteration budget runs out.
    ///
    /// The optimizer state is reset at the start of every run. The stop token
    /// is checked before asking for a gradient and again before applying it,
    /// a gradient computed while a stop was requested is discarded.
    ///
    /// # Arguments
    /// * `weights` - The model's weights, updated in place.
    /// * `source` - Computes the objective and its gradient.
    /// * `progress` - Receives the objective after every applied update.
    /// * `stop` - Cooperative cancellation token.
    ///
    /// # Returns
    /// The outcome of the run or a `SizeMismatch` error if `weights` or the
    /// source don't match the amount of features.
    pub fn run<G, P>(
        &mut self,
        weights: &mut [f64],
        source: &mut G,
        progress: &mut P,
        stop: &StopToken,
    ) -> Result<Outcome>
    where
        G: GradientSource + ?Sized,
        P: Progress + ?Sized,
    {
        if weights.len() != self.state.len() {
            return Err(RpropErr::SizeMismatch {
                what: "weights",
                got: weights.len(),
                expected: self.state.len(),
            });
        }

        if source.features() != self.state.len() {
            return Err(RpropErr::SizeMismatch {
                what: "gradient source",
                got: source.features(),
                expected: self.state.len(),
            });
        }

        self.state.reset();
        info!(
            features = self.state.len(),
            workers = self.dispatcher.workers().get();
            "starting rprop training"
        );

        let mut iterations = 0;
        let mut objective = None;

        let status = loop {
            if iterations == self.max_iterations {
                break Status::Exhausted;
            }

            if stop.is_requested() {
                break Status::StoppedExternally;
            }

            let fx = source.gradient(weights, &mut self.buffers);
            if !fx.is_finite() {
                warn!(iteration = iterations + 1; "the gradient source returned a non-finite objective: {fx}");
            }

            if stop.is_requested() {
                warn!(iteration = iterations + 1; "stop requested, discarding the computed gradient");
                break Status::StoppedExternally;
            }

            self.apply(weights)?;
            iterations += 1;
            objective = Some(fx);

            if log_enabled!(Level::Debug) {
                let active = weights.iter().filter(|&&w| w != 0.).count();
                debug!(iteration = iterations, active = active; "update applied");
            }

            match progress.report(iterations, fx) {
                Verdict::Continue => {}
                Verdict::Converged => break Status::Converged,
                Verdict::Stop => break Status::StoppedExternally,
            }
        };

        info!(iterations = iterations; "training finished: {status}");
        Ok(Outcome {
            status,
            iterations,
            objective,
        })
    }

    /// Applies one update to every feature using the gradient in the primary buffer.
    fn apply(&mut self, weights: &mut [f64]) -> Result<()> {
        let rprop = self.rprop;
        let workers = self.dispatcher.workers();

        let slabs = self
            .state
            .slab(weights, self.buffers.primary_mut())?
            .partition(workers);

        self.dispatcher
            .dispatch(slabs, |_, _, mut slab| rprop.update(&mut slab));

        Ok(())
    }
}
