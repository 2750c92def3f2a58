mod outcome;
mod progress;
mod source;
mod stop;
mod trainer;

pub use outcome::{Outcome, Status};
pub use progress::{ConvergenceWindow, Progress, Verdict};
pub use source::GradientSource;
pub use stop::StopToken;
pub use trainer::Trainer;
