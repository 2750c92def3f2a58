use crate::storage::GradientBuffers;

/// Computes the objective and its gradient for the current weights.
pub trait GradientSource {
    /// The amount of features the source computes a gradient for.
    fn features(&self) -> usize;

    /// Evaluates the objective at `weights`.
    ///
    /// # Arguments
    /// * `weights` - The current model weights.
    /// * `buffers` - One buffer per worker, the full gradient must be left in the primary buffer.
    ///
    /// # Returns
    /// The objective value at `weights`.
    fn gradient(&mut self, weights: &[f64], buffers: &mut GradientBuffers) -> f64;
}
