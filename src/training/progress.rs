use std::{collections::VecDeque, time::Instant};

use log::info;

use crate::config::ConvergenceConfig;

/// What the training loop should do after an iteration was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Converged,
    Stop,
}

/// Receives the objective value after every completed iteration.
pub trait Progress {
    /// Reports a completed iteration.
    ///
    /// # Arguments
    /// * `iteration` - The amount of iterations completed so far, starting at 1.
    /// * `objective` - The objective value computed during that iteration.
    fn report(&mut self, iteration: usize, objective: f64) -> Verdict;
}

/// Plain callbacks answer whether training should continue.
impl<F> Progress for F
where
    F: FnMut(usize, f64) -> bool,
{
    fn report(&mut self, iteration: usize, objective: f64) -> Verdict {
        if self(iteration, objective) {
            Verdict::Continue
        } else {
            Verdict::Stop
        }
    }
}

/// Logs every iteration and declares convergence once the objective stalls.
///
/// Keeps the last `window` objective values, training has converged when
/// their spread is at most `epsilon` relative to their magnitude.
#[derive(Debug)]
pub struct ConvergenceWindow {
    window: usize,
    epsilon: f64,
    history: VecDeque<f64>,
    started: Instant,
}

impl ConvergenceWindow {
    /// Creates a new `ConvergenceWindow`.
    ///
    /// # Arguments
    /// * `config` - The window size and tolerance, a zero window never converges.
    pub fn new(config: &ConvergenceConfig) -> Self {
        Self {
            window: config.window,
            epsilon: config.epsilon,
            history: VecDeque::with_capacity(config.window),
            started: Instant::now(),
        }
    }

    fn has_converged(&self) -> bool {
        if self.window == 0 || self.history.len() < self.window {
            return false;
        }

        if self.history.iter().any(|fx| !fx.is_finite()) {
            return false;
        }

        let (min, max) = self
            .history
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &fx| {
                (lo.min(fx), hi.max(fx))
            });

        max - min <= self.epsilon * min.abs().max(max.abs())
    }
}

impl Progress for ConvergenceWindow {
    fn report(&mut self, iteration: usize, objective: f64) -> Verdict {
        let elapsed = self.started.elapsed().as_secs_f64();
        info!("[{iteration:4}] obj={objective:<12.6} time={elapsed:.2}s");

        if self.window == 0 {
            return Verdict::Continue;
        }

        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(objective);

        if self.has_converged() {
            info!(iteration = iteration; "objective stalled over the last {} iterations", self.window);
            Verdict::Converged
        } else {
            Verdict::Continue
        }
    }
}
