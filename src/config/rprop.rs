use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, RpropErr},
    storage::INITIAL_STEP,
};

/// Tuning constants of the resilient propagation update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct RpropConfig {
    /// Lower bound of every per-feature step size.
    pub step_min: f64,
    /// Upper bound of every per-feature step size.
    pub step_max: f64,
    /// Growth factor applied when two consecutive gradients agree in sign.
    pub step_inc: f64,
    /// Shrink factor applied when two consecutive gradients disagree in sign.
    pub step_dec: f64,
    /// Weight of the l1 penalty, `0` disables the orthant projection.
    pub rho1: f64,
    /// Whether a sign disagreement reverts the previously applied delta.
    pub backtracking: bool,
}

impl Default for RpropConfig {
    fn default() -> Self {
        Self {
            step_min: 1e-8,
            step_max: 50.,
            step_inc: 1.2,
            step_dec: 0.5,
            rho1: 0.,
            backtracking: true,
        }
    }
}

impl RpropConfig {
    /// Checks that the constants describe a well formed update rule.
    ///
    /// # Returns
    /// An `InvalidConfig` error describing the first offending constant.
    pub fn validate(&self) -> Result<()> {
        let Self {
            step_min,
            step_max,
            step_inc,
            step_dec,
            rho1,
            ..
        } = *self;

        let constants = [
            ("step_min", step_min),
            ("step_max", step_max),
            ("step_inc", step_inc),
            ("step_dec", step_dec),
            ("rho1", rho1),
        ];

        if let Some((name, value)) = constants.iter().find(|(_, v)| !v.is_finite()) {
            return Err(RpropErr::InvalidConfig(format!(
                "{name} must be finite, got {value}"
            )));
        }

        if step_min <= 0. {
            return Err(RpropErr::InvalidConfig(format!(
                "step_min must be positive, got {step_min}"
            )));
        }

        if !(step_min..=step_max).contains(&INITIAL_STEP) {
            return Err(RpropErr::InvalidConfig(format!(
                "the initial step {INITIAL_STEP} must lie within [step_min, step_max], \
                 got [{step_min}, {step_max}]"
            )));
        }

        if step_inc <= 1. {
            return Err(RpropErr::InvalidConfig(format!(
                "step_inc must be greater than 1, got {step_inc}"
            )));
        }

        if step_dec <= 0. || step_dec >= 1. {
            return Err(RpropErr::InvalidConfig(format!(
                "step_dec must lie within (0, 1), got {step_dec}"
            )));
        }

        if rho1 < 0. {
            return Err(RpropErr::InvalidConfig(format!(
                "rho1 must not be negative, got {rho1}"
            )));
        }

        Ok(())
    }
}
