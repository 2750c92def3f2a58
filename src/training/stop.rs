use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A cooperative cancellation token.
///
/// Clones share the same flag, so one clone can be handed to a signal
/// handler while the trainer polls another one between iterations.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    requested: Arc<AtomicBool>,
}

impl StopToken {
    /// Creates a new, unset `StopToken`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks every holder of this token to stop at its next checkpoint.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Returns whether a stop has been requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
