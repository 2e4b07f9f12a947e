//! Exponential decay model.

use crate::error::{FitError, Result};
use crate::model::{Model, ModelDerivative};
use crate::parameters::ParameterConstraint;
use ndarray::{array, Array1, ArrayViewMut1};

/// An exponential model for fitting exponential decay
///
/// The exponential function is defined as:
///
/// f(x) = amplitude * exp(-x/decay)
///
/// Where:
/// - amplitude: the value at x = 0
/// - decay: the decay constant, kept positive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExponentialModel;

impl ExponentialModel {
    /// Create a new exponential model.
    pub fn new() -> Self {
        Self
    }

    /// Estimate starting parameters from data.
    ///
    /// Fits a straight line to `ln(y)` over the samples with positive `y`;
    /// the intercept gives the amplitude and the slope the decay constant.
    ///
    /// # Errors
    ///
    /// * [`FitError::DimensionMismatch`] if `x` and `y` differ in length
    /// * [`FitError::InvalidInput`] with fewer than two positive samples
    pub fn guess(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
        if x.len() != y.len() {
            return Err(FitError::DimensionMismatch(format!(
                "x has {} samples, y has {}",
                x.len(),
                y.len()
            )));
        }

        let points: Vec<(f64, f64)> = x
            .iter()
            .zip(y.iter())
            .filter(|&(_, &y_val)| y_val > 0.0)
            .map(|(&x_val, &y_val)| (x_val, y_val.ln()))
            .collect();
        if points.len() < 2 {
            return Err(FitError::InvalidInput(
                "need at least two positive samples to guess an exponential".to_string(),
            ));
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
        let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
        let sxy: f64 = points
            .iter()
            .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
            .sum();

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        let intercept = mean_y - slope * mean_x;

        // A flat or rising trend has no decay constant; fall back to the x span
        let decay = if slope < 0.0 {
            -1.0 / slope
        } else {
            let (lo, hi) = points
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                    (lo.min(p.0), hi.max(p.0))
                });
            (hi - lo).max(1.0)
        };

        Ok(array![intercept.exp(), decay])
    }
}

impl Model for ExponentialModel {
    fn parameter_count(&self) -> usize {
        2
    }

    fn initial_parameters(&self) -> Array1<f64> {
        array![1.0, 1.0]
    }

    fn constraints(&self) -> Vec<ParameterConstraint> {
        vec![ParameterConstraint::None, ParameterConstraint::Positive]
    }

    fn parameter_names(&self) -> Vec<String> {
        vec!["amplitude".to_string(), "decay".to_string()]
    }

    fn eval(&self, params: &Array1<f64>, x: f64) -> f64 {
        params[0] * (-x / params[1]).exp()
    }

    fn derivative(&self) -> Option<&dyn ModelDerivative> {
        Some(self)
    }
}

impl ModelDerivative for ExponentialModel {
    fn eval_derivatives(&self, params: &Array1<f64>, x: f64, mut out: ArrayViewMut1<'_, f64>) {
        let amplitude = params[0];
        let decay = params[1];
        let e = (-x / decay).exp();

        out[0] = e;
        out[1] = amplitude * x * e / (decay * decay);
    }
}
