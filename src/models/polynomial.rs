//! Polynomial models.

use crate::model::{Model, ModelDerivative};
use ndarray::{Array1, ArrayViewMut1};

/// A polynomial model of arbitrary degree
///
/// The polynomial function is defined as:
///
/// f(x) = c[0] + c[1]*x + c[2]*x^2 + ... + c[n]*x^n
///
/// Where c[i] are the polynomial coefficients. The partial derivative with
/// respect to c[i] is x^i, so the model always supplies closed-form
/// derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolynomialModel {
    degree: usize,
}

impl PolynomialModel {
    /// Create a polynomial model of the given degree.
    ///
    /// The model has `degree + 1` parameters, starting at c0 = 1 and every
    /// other coefficient 0.
    pub fn new(degree: usize) -> Self {
        Self { degree }
    }

    /// Degree of the polynomial.
    pub fn degree(&self) -> usize {
        self.degree
    }
}

impl Model for PolynomialModel {
    fn parameter_count(&self) -> usize {
        self.degree + 1
    }

    fn initial_parameters(&self) -> Array1<f64> {
        let mut params = Array1::zeros(self.degree + 1);
        params[0] = 1.0;
        params
    }

    fn parameter_names(&self) -> Vec<String> {
        (0..=self.degree).map(|i| format!("c{}", i)).collect()
    }

    fn eval(&self, params: &Array1<f64>, x: f64) -> f64 {
        // Horner's scheme
        params.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    fn derivative(&self) -> Option<&dyn ModelDerivative> {
        Some(self)
    }
}

impl ModelDerivative for PolynomialModel {
    fn eval_derivatives(&self, _params: &Array1<f64>, x: f64, mut out: ArrayViewMut1<'_, f64>) {
        let mut x_power = 1.0;
        for d in out.iter_mut() {
            *d = x_power;
            x_power *= x;
        }
    }
}
