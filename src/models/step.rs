//! Step-like models for fitting.

use crate::error::{FitError, Result};
use crate::model::Model;
use crate::parameters::ParameterConstraint;
use ndarray::{array, Array1};

/// A sigmoid (logistic) step model.
///
/// The sigmoid function is defined as:
/// f(x) = amplitude / (1 + exp(-(x - center) / sigma))
///
/// It is characterized by:
/// - `amplitude`: The height of the step
/// - `center`: The position of the midpoint
/// - `sigma`: The width of the transition, kept positive
///
/// The model has no closed-form derivatives and is always differentiated
/// numerically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SigmoidModel;

impl SigmoidModel {
    /// Create a new sigmoid model.
    pub fn new() -> Self {
        Self
    }

    /// Estimate starting parameters from data.
    ///
    /// The amplitude is the largest sample, the center is where the samples
    /// cross half of it and sigma comes from the 25%-75% rise width.
    ///
    /// # Errors
    ///
    /// * [`FitError::DimensionMismatch`] if `x` and `y` differ in length
    /// * [`FitError::InvalidInput`] with fewer than 3 samples
    pub fn guess(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
        if x.len() != y.len() {
            return Err(FitError::DimensionMismatch(format!(
                "x has {} samples, y has {}",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 3 {
            return Err(FitError::InvalidInput(
                "Need at least 3 data points for parameter guessing".to_string(),
            ));
        }

        let mut xy: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
        xy.sort_by(|a, b| a.0.total_cmp(&b.0));

        let amplitude = y.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let x_first = xy[0].0;
        let x_last = xy[xy.len() - 1].0;

        let crossing = |level: f64| {
            xy.windows(2).find_map(|w| {
                let (x1, y1) = w[0];
                let (x2, y2) = w[1];
                let crosses = (y1 < level && y2 >= level) || (y1 >= level && y2 < level);
                crosses.then(|| x1 + (level - y1) * (x2 - x1) / (y2 - y1))
            })
        };

        let center = crossing(0.5 * amplitude).unwrap_or(0.5 * (x_first + x_last));
        let x_low = crossing(0.25 * amplitude).unwrap_or(x_first);
        let x_high = crossing(0.75 * amplitude).unwrap_or(x_last);

        // The 25%-75% rise of a logistic spans 2 ln 3 sigma
        let mut sigma = (x_high - x_low).abs() / (2.0 * 3.0_f64.ln());
        if sigma < 1e-10 {
            sigma = ((x_last - x_first).abs() / 10.0).max(1e-5);
        }

        Ok(array![amplitude, center, sigma])
    }
}

impl Model for SigmoidModel {
    fn parameter_count(&self) -> usize {
        3
    }

    fn initial_parameters(&self) -> Array1<f64> {
        array![1.0, 0.0, 1.0]
    }

    fn constraints(&self) -> Vec<ParameterConstraint> {
        vec![
            ParameterConstraint::None,
            ParameterConstraint::None,
            ParameterConstraint::Positive,
        ]
    }

    fn parameter_names(&self) -> Vec<String> {
        vec![
            "amplitude".to_string(),
            "center".to_string(),
            "sigma".to_string(),
        ]
    }

    fn eval(&self, params: &Array1<f64>, x: f64) -> f64 {
        params[0] / (1.0 + (-(x - params[1]) / params[2]).exp())
    }
}
