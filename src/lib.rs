//! Weight-update core for training large sparse linear models.
//!
//! The update rule is resilient propagation (Rprop), with an orthant-wise
//! pseudo-gradient when an l1 penalty is used. The features are split into
//! disjoint slabs that are updated in parallel, one per worker.

pub mod config;
pub mod error;
pub mod execution;
pub mod objectives;
pub mod optimization;
pub mod storage;
pub mod training;

pub use config::{ConvergenceConfig, RpropConfig, TrainingConfig};
pub use error::{Result, RpropErr};
pub use training::{ConvergenceWindow, GradientSource, Outcome, Progress, Status, StopToken, Trainer, Verdict};
