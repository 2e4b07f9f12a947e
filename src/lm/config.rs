//! Configuration options for the Levenberg-Marquardt fit.
//!
//! `FitConfig` can be built in code through its `with_*` setters or loaded
//! from JSON. Missing JSON fields fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};
use crate::utils::finite_difference::DEFAULT_THRESHOLD;

/// Method for calculating the derivative cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiffMethod {
    /// Use the model's closed-form derivatives when it has them, finite
    /// differences otherwise
    #[default]
    Auto,

    /// Always use adaptive forward differences
    FiniteDifference,
}

/// Configuration options for a fit session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Maximum number of iterations. Default: 100
    pub max_iterations: usize,

    /// Stop once |current chi² - trial chi²| falls below this. Default: 1e-30
    pub min_delta_chi2: f64,

    /// Stop once |Δchi²| / max(chi², 1e-10) falls below this; 0 disables.
    /// Default: 0
    pub relative_delta_chi2: f64,

    /// Step and quotient-change threshold of the numerical derivative.
    /// Default: 1e-4
    pub derivative_threshold: f64,

    /// Initial value for the damping parameter. Default: 1e-3
    pub initial_lambda: f64,

    /// Method to use for the derivative cache. Default: Auto
    pub diff_method: DiffMethod,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            min_delta_chi2: 1e-30,
            relative_delta_chi2: 0.0,
            derivative_threshold: DEFAULT_THRESHOLD,
            initial_lambda: 1e-3,
            diff_method: DiffMethod::default(),
        }
    }
}

impl FitConfig {
    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the absolute chi-squared change threshold.
    pub fn with_min_delta_chi2(mut self, min_delta_chi2: f64) -> Self {
        self.min_delta_chi2 = min_delta_chi2;
        self
    }

    /// Set the relative chi-squared change threshold.
    pub fn with_relative_delta_chi2(mut self, relative_delta_chi2: f64) -> Self {
        self.relative_delta_chi2 = relative_delta_chi2;
        self
    }

    /// Set the numerical derivative threshold.
    pub fn with_derivative_threshold(mut self, threshold: f64) -> Self {
        self.derivative_threshold = threshold;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.initial_lambda = lambda;
        self
    }

    /// Set the method used for the derivative cache.
    pub fn with_diff_method(mut self, method: DiffMethod) -> Self {
        self.diff_method = method;
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(FitError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.initial_lambda > 0.0 && self.initial_lambda.is_finite()) {
            return Err(FitError::InvalidConfig(format!(
                "initial_lambda must be positive and finite, got {}",
                self.initial_lambda
            )));
        }
        if !(self.derivative_threshold > 0.0) {
            return Err(FitError::InvalidConfig(format!(
                "derivative_threshold must be positive, got {}",
                self.derivative_threshold
            )));
        }
        if !(self.min_delta_chi2 >= 0.0) || !(self.relative_delta_chi2 >= 0.0) {
            return Err(FitError::InvalidConfig(
                "chi-squared thresholds must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serialize the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
