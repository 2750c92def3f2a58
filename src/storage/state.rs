use super::{Slab, alloc};
use crate::error::{Result, RpropErr};

/// The step size every feature starts a run with.
pub const INITIAL_STEP: f64 = 0.1;

/// The per-feature memory of the optimizer, kept between iterations.
///
/// Stored as one vector per quantity, all indexed by feature.
#[derive(Debug)]
pub struct OptimizerState {
    prev_grad: Box<[f64]>,
    step: Box<[f64]>,
    delta: Box<[f64]>,
}

impl OptimizerState {
    /// Creates a new `OptimizerState`.
    ///
    /// # Arguments
    /// * `features` - The amount of features of the model.
    ///
    /// # Returns
    /// A fresh state or an `Alloc` error.
    pub fn new(features: usize) -> Result<Self> {
        Ok(Self {
            prev_grad: alloc::filled("previous gradients", features, 0.)?,
            step: alloc::filled("step sizes", features, INITIAL_STEP)?,
            delta: alloc::filled("deltas", features, 0.)?,
        })
    }

    /// Puts every feature back to its initial state.
    pub fn reset(&mut self) {
        self.prev_grad.fill(0.);
        self.step.fill(INITIAL_STEP);
        self.delta.fill(0.);
    }

    pub fn len(&self) -> usize {
        self.step.len()
    }

    pub fn is_empty(&self) -> bool {
        self.step.is_empty()
    }

    /// The raw gradient seen for every feature at its last update.
    pub fn prev_grad(&self) -> &[f64] {
        &self.prev_grad
    }

    /// The current step size of every feature.
    pub fn step(&self) -> &[f64] {
        &self.step
    }

    /// The last delta applied to every feature.
    pub fn delta(&self) -> &[f64] {
        &self.delta
    }

    /// Borrows the whole state together with the weights and the gradient as a single slab.
    ///
    /// # Arguments
    /// * `weights` - The model's weights.
    /// * `grad` - The gradient at `weights`.
    ///
    /// # Returns
    /// A slab covering every feature or a `SizeMismatch` error.
    pub fn slab<'a>(&'a mut self, weights: &'a mut [f64], grad: &'a mut [f64]) -> Result<Slab<'a>> {
        let expected = self.len();

        for (what, got) in [("weights", weights.len()), ("gradient", grad.len())] {
            if got != expected {
                return Err(RpropErr::SizeMismatch {
                    what,
                    got,
                    expected,
                });
            }
        }

        Ok(Slab::new(
            0,
            weights,
            grad,
            &mut self.prev_grad,
            &mut self.step,
            &mut self.delta,
        ))
    }
}
