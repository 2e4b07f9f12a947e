//! Peak models for fitting.

use crate::error::{FitError, Result};
use crate::model::{Model, ModelDerivative};
use crate::parameters::ParameterConstraint;
use ndarray::{array, Array1, ArrayViewMut1};

/// FWHM of a Gaussian divided by its sigma, 2 * sqrt(2 * ln 2)
const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949;

/// A Gaussian peak model.
///
/// The Gaussian function is defined as:
/// f(x) = amplitude * exp(-(x - center)² / (2 * sigma²))
///
/// It is characterized by:
/// - `amplitude`: The height of the peak
/// - `center`: The position of the peak center
/// - `sigma`: The standard deviation, kept positive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GaussianModel;

impl GaussianModel {
    /// Create a new Gaussian model.
    pub fn new() -> Self {
        Self
    }

    /// Estimate starting parameters from data.
    ///
    /// The amplitude and center come from the largest sample; sigma from the
    /// width at half height.
    ///
    /// # Errors
    ///
    /// * [`FitError::DimensionMismatch`] if `x` and `y` differ in length
    /// * [`FitError::InvalidInput`] for an empty sample set
    pub fn guess(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
        if x.len() != y.len() {
            return Err(FitError::DimensionMismatch(format!(
                "x has {} samples, y has {}",
                x.len(),
                y.len()
            )));
        }

        let (max_idx, max_y) = y
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, y_val)| match best {
                Some((_, b)) if b >= y_val => best,
                _ => Some((i, y_val)),
            })
            .ok_or_else(|| FitError::InvalidInput("cannot guess from no samples".to_string()))?;

        let half_height = max_y / 2.0;

        let mut left_idx = max_idx;
        while left_idx > 0 && y[left_idx] > half_height {
            left_idx -= 1;
        }

        let mut right_idx = max_idx;
        while right_idx < y.len() - 1 && y[right_idx] > half_height {
            right_idx += 1;
        }

        let fwhm = if left_idx < right_idx {
            (x[right_idx] - x[left_idx]).abs()
        } else {
            (x[x.len() - 1] - x[0]).abs() / 5.0
        };

        Ok(array![max_y, x[max_idx], (fwhm / FWHM_PER_SIGMA).max(0.1)])
    }
}

impl Model for GaussianModel {
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
        let arg = (x - params[1]) / params[2];
        params[0] * (-0.5 * arg * arg).exp()
    }

    fn derivative(&self) -> Option<&dyn ModelDerivative> {
        Some(self)
    }
}

impl ModelDerivative for GaussianModel {
    fn eval_derivatives(&self, params: &Array1<f64>, x: f64, mut out: ArrayViewMut1<'_, f64>) {
        let amplitude = params[0];
        let center = params[1];
        let sigma = params[2];

        let dx = x - center;
        let sigma2 = sigma * sigma;
        let g = (-dx * dx / (2.0 * sigma2)).exp();

        out[0] = g;
        out[1] = amplitude * g * dx / sigma2;
        out[2] = amplitude * g * dx * dx / (sigma2 * sigma);
    }
}
