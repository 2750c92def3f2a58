use std::fmt::{self, Display};

/// The state of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Converged,
    StoppedExternally,
    Exhausted,
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Running => "running",
            Self::Converged => "converged",
            Self::StoppedExternally => "stopped",
            Self::Exhausted => "iteration budget exhausted",
        };

        f.write_str(s)
    }
}

/// The summary of a finished training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// The terminal status of the run.
    pub status: Status,
    /// The amount of iterations whose update was applied.
    pub iterations: usize,
    /// The objective value of the last applied iteration.
    pub objective: Option<f64>,
}
