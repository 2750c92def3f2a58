mod rprop;
mod training;

pub use rprop::RpropConfig;
pub use training::{ConvergenceConfig, TrainingConfig};
