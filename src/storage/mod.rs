mod alloc;
mod buffers;
mod slab;
mod state;

pub use buffers::GradientBuffers;
pub use slab::Slab;
pub use state::{INITIAL_STEP, OptimizerState};
