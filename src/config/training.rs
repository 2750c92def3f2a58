use std::{fs, num::NonZeroUsize, path::Path};

use serde::{Deserialize, Serialize};

use super::RpropConfig;
use crate::error::{Result, RpropErr};

/// Parameters of the objective-window convergence check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct ConvergenceConfig {
    /// Amount of recent objective values to compare, `0` disables the check.
    pub window: usize,
    /// Relative spread of the window under which training is considered converged.
    pub epsilon: f64,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            window: 5,
            epsilon: 1e-5,
        }
    }
}

/// Everything the training loop needs besides the model itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct TrainingConfig {
    pub max_iterations: usize,
    pub workers: NonZeroUsize,
    pub rprop: RpropConfig,
    pub convergence: ConvergenceConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_iterations: usize::MAX,
            workers: NonZeroUsize::MIN,
            rprop: RpropConfig::default(),
            convergence: ConvergenceConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Parses and validates a `TrainingConfig` from a json document.
    ///
    /// # Arguments
    /// * `json` - The json document, missing fields take their default value.
    ///
    /// # Returns
    /// The parsed configuration or a `Parse`/`InvalidConfig` error.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a `TrainingConfig` from a json file.
    ///
    /// # Arguments
    /// * `path` - The location of the json file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Validates the nested configurations.
    pub fn validate(&self) -> Result<()> {
        self.rprop.validate()?;

        let epsilon = self.convergence.epsilon;
        if !epsilon.is_finite() || epsilon < 0. {
            return Err(RpropErr::InvalidConfig(format!(
                "convergence epsilon must be finite and not negative, got {epsilon}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = TrainingConfig::from_json("{}").unwrap();
        assert_eq!(config, TrainingConfig::default());
    }

    #[test]
    fn nested_sections() {
        let json = r#"{
            "max_iterations": 20,
            "workers": 4,
            "rprop": { "rho1": 0.25, "backtracking": false },
            "convergence": { "window": 3 }
        }"#;

        let config = TrainingConfig::from_json(json).unwrap();
        assert_eq!(config.max_iterations, 20);
        assert_eq!(config.workers.get(), 4);
        assert_eq!(config.rprop.rho1, 0.25);
        assert!(!config.rprop.backtracking);
        assert_eq!(config.convergence.window, 3);
        assert_eq!(config.convergence.epsilon, 1e-5);
    }

    #[test]
    fn zero_workers_is_a_parse_error() {
        let err = TrainingConfig::from_json(r#"{ "workers": 0 }"#).unwrap_err();
        assert!(matches!(err, RpropErr::Parse(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = TrainingConfig::from_json(r#"{ "threads": 2 }"#).unwrap_err();
        assert!(matches!(err, RpropErr::Parse(_)));
    }

    #[test]
    fn invalid_rprop_section_is_rejected() {
        let err = TrainingConfig::from_json(r#"{ "rprop": { "step_dec": 2.0 } }"#).unwrap_err();
        assert!(matches!(err, RpropErr::InvalidConfig(_)));
    }

    #[test]
    fn negative_epsilon_is_rejected() {
        let json = r#"{ "convergence": { "epsilon": -1.0 } }"#;
        let err = TrainingConfig::from_json(json).unwrap_err();
        assert!(matches!(err, RpropErr::InvalidConfig(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = TrainingConfig::from_path("/nonexistent/rprop.json").unwrap_err();
        assert!(matches!(err, RpropErr::Io(_)));
    }
}
