use std::{num::NonZeroUsize, ops::Range};

use crate::execution::partition;

/// A mutable view over a contiguous range of features.
///
/// Holds one sub-slice of every per-feature vector, all covering the same
/// range. Slabs are produced by splitting a larger slab, so two slabs alive at
/// the same time never share a feature.
#[derive(Debug)]
pub struct Slab<'a> {
    offset: usize,
    pub(crate) weights: &'a mut [f64],
    pub(crate) grad: &'a mut [f64],
    pub(crate) prev_grad: &'a mut [f64],
    pub(crate) step: &'a mut [f64],
    pub(crate) delta: &'a mut [f64],
}

impl<'a> Slab<'a> {
    /// Creates a new `Slab`, the caller guarantees all slices have the same length.
    pub(crate) fn new(
        offset: usize,
        weights: &'a mut [f64],
        grad: &'a mut [f64],
        prev_grad: &'a mut [f64],
        step: &'a mut [f64],
        delta: &'a mut [f64],
    ) -> Self {
        debug_assert!(
            [grad.len(), prev_grad.len(), step.len(), delta.len()]
                .iter()
                .all(|&len| len == weights.len())
        );

        Self {
            offset,
            weights,
            grad,
            prev_grad,
            step,
            delta,
        }
    }

    /// Returns the index of the first feature of this slab.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the amount of features in this slab.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Returns the global feature indices covered by this slab.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len()
    }

    /// Splits the slab in two at `mid`, relative to the slab's start.
    ///
    /// # Panics
    /// If `mid > self.len()`.
    pub fn split_at(self, mid: usize) -> (Slab<'a>, Slab<'a>) {
        let Self {
            offset,
            weights,
            grad,
            prev_grad,
            step,
            delta,
        } = self;

        let (w0, w1) = weights.split_at_mut(mid);
        let (g0, g1) = grad.split_at_mut(mid);
        let (gp0, gp1) = prev_grad.split_at_mut(mid);
        let (s0, s1) = step.split_at_mut(mid);
        let (d0, d1) = delta.split_at_mut(mid);

        (
            Slab::new(offset, w0, g0, gp0, s0, d0),
            Slab::new(offset + mid, w1, g1, gp1, s1, d1),
        )
    }

    /// Cuts the slab into one contiguous slab per worker.
    ///
    /// Worker `id` receives the features `[⌊len·id/W⌋, ⌊len·(id+1)/W⌋)`,
    /// shifted by this slab's offset.
    ///
    /// # Arguments
    /// * `workers` - The amount of slabs to produce.
    ///
    /// # Returns
    /// Exactly `workers` slabs, some possibly empty, ordered by worker id.
    pub fn partition(self, workers: NonZeroUsize) -> Vec<Slab<'a>> {
        let mut slabs = Vec::with_capacity(workers.get());
        let mut rest = self;

        for range in partition::ranges(rest.len(), workers) {
            let (head, tail) = rest.split_at(range.len());
            slabs.push(head);
            rest = tail;
        }

        slabs
    }
}
