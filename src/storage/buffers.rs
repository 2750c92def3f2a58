use std::num::NonZeroUsize;

use super::alloc;
use crate::error::Result;

/// One gradient accumulation buffer per worker.
///
/// Buffer `0` is the primary buffer, once a gradient source returns it must
/// hold the full gradient. The other buffers are scratch space the source may
/// use to accumulate partial gradients in parallel.
#[derive(Debug)]
pub struct GradientBuffers {
    features: usize,
    bufs: Box<[Box<[f64]>]>,
}

impl GradientBuffers {
    /// Creates a new `GradientBuffers`.
    ///
    /// # Arguments
    /// * `features` - The length of every buffer.
    /// * `workers` - The amount of buffers.
    ///
    /// # Returns
    /// Zeroed buffers or an `Alloc` error.
    pub fn new(features: usize, workers: NonZeroUsize) -> Result<Self> {
        let bufs = (0..workers.get())
            .map(|_| alloc::filled("gradient buffer", features, 0.))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            features,
            bufs: bufs.into_boxed_slice(),
        })
    }

    /// Returns the length of every buffer.
    pub fn features(&self) -> usize {
        self.features
    }

    /// Returns the amount of buffers.
    pub fn workers(&self) -> usize {
        self.bufs.len()
    }

    pub fn primary(&self) -> &[f64] {
        &self.bufs[0]
    }

    pub fn primary_mut(&mut self) -> &mut [f64] {
        &mut self.bufs[0]
    }

    /// Splits the buffers into the primary buffer and the scratch buffers.
    pub fn split_mut(&mut self) -> (&mut [f64], &mut [Box<[f64]>]) {
        let (primary, scratch) = self.bufs.split_at_mut(1);
        (&mut primary[0], scratch)
    }

    /// Mutable access to every buffer, indexed by worker id.
    pub fn as_mut_slice(&mut self) -> &mut [Box<[f64]>] {
        &mut self.bufs
    }

    /// Zeroes every buffer.
    pub fn clear(&mut self) {
        self.bufs.iter_mut().for_each(|buf| buf.fill(0.));
    }

    /// Adds every scratch buffer into the primary buffer.
    pub fn reduce(&mut self) {
        let (primary, scratch) = self.split_mut();

        for buf in scratch.iter() {
            primary.iter_mut().zip(buf.iter()).for_each(|(acc, g)| *acc += g);
        }
    }
}
