//! Model trait and closure-based model implementation.
//!
//! A [`Model`] is a parametric scalar function of `x`. Models that know their
//! own partial derivatives additionally implement [`ModelDerivative`] and
//! hand it out through [`Model::derivative`]; every other model is
//! differentiated numerically by the fit.

use crate::parameters::ParameterConstraint;
use ndarray::{Array1, ArrayViewMut1};

/// A trait representing a model that can be fit to data.
///
/// Implementations must be pure: for a fixed parameter vector, `eval` returns
/// the same value for the same `x` and has no side effects.
pub trait Model {
    /// Number of parameters the model takes.
    fn parameter_count(&self) -> usize;

    /// Starting values used when the caller does not supply any.
    fn initial_parameters(&self) -> Array1<f64>;

    /// Domain constraint for each parameter, in parameter order.
    fn constraints(&self) -> Vec<ParameterConstraint> {
        vec![ParameterConstraint::None; self.parameter_count()]
    }

    /// Display names for each parameter, in parameter order.
    fn parameter_names(&self) -> Vec<String> {
        (0..self.parameter_count())
            .map(|i| format!("p{}", i))
            .collect()
    }

    /// Evaluate the model at `x` for the given parameters.
    ///
    /// # Arguments
    ///
    /// * `params` - The parameter values, `parameter_count()` long
    /// * `x` - The independent variable
    ///
    /// # Returns
    ///
    /// * The predicted value. Non-finite values are allowed: an overflowing
    ///   trial is rejected, a NaN ends the fit with a numerical-error status.
    fn eval(&self, params: &Array1<f64>, x: f64) -> f64;

    /// Closed-form partial derivatives, if the model provides them.
    ///
    /// Queried once when a fit session is built.
    fn derivative(&self) -> Option<&dyn ModelDerivative> {
        None
    }

    /// Evaluate the model at every point of `x`.
    fn predict(&self, params: &Array1<f64>, x: &Array1<f64>) -> Array1<f64> {
        x.mapv(|x_val| self.eval(params, x_val))
    }
}

/// Closed-form derivative capability of a [`Model`].
pub trait ModelDerivative {
    /// Write ∂f/∂pᵢ at `x` into `out[i]` for every parameter `i`.
    ///
    /// `out` is exactly `parameter_count()` long and every entry must be
    /// written.
    fn eval_derivatives(&self, params: &Array1<f64>, x: f64, out: ArrayViewMut1<'_, f64>);
}

type EvalFn = dyn Fn(&Array1<f64>, f64) -> f64 + Send + Sync;
type DerivativeFn = dyn Fn(&Array1<f64>, f64, ArrayViewMut1<'_, f64>) + Send + Sync;

/// A model assembled from closures.
///
/// ```
/// use lmcurve::model::{FnModel, Model};
/// use lmcurve::parameters::ParameterConstraint;
/// use ndarray::array;
///
/// // y = a * x^2 + c, with `a` kept positive
/// let model = FnModel::new(array![1.0, 0.0], |p, x| p[0] * x * x + p[1])
///     .with_names(&["a", "c"])
///     .with_constraints(vec![ParameterConstraint::Positive, ParameterConstraint::None])
///     .with_derivatives(|_p, x, mut out| {
///         out[0] = x * x;
///         out[1] = 1.0;
///     });
///
/// assert_eq!(model.eval(&array![2.0, 1.0], 3.0), 19.0);
/// assert!(model.derivative().is_some());
/// ```
pub struct FnModel {
    initial: Array1<f64>,
    constraints: Vec<ParameterConstraint>,
    names: Vec<String>,
    eval_fn: Box<EvalFn>,
    derivative_fn: Option<Box<DerivativeFn>>,
}

impl FnModel {
    /// Create a model from its starting values and evaluation closure.
    ///
    /// The parameter count is the length of `initial`.
    pub fn new<F>(initial: Array1<f64>, eval_fn: F) -> Self
    where
        F: Fn(&Array1<f64>, f64) -> f64 + Send + Sync + 'static,
    {
        let n = initial.len();
        Self {
            initial,
            constraints: vec![ParameterConstraint::None; n],
            names: (0..n).map(|i| format!("p{}", i)).collect(),
            eval_fn: Box::new(eval_fn),
            derivative_fn: None,
        }
    }

    /// Attach per-parameter constraints.
    ///
    /// A length that differs from the parameter count is reported when a fit
    /// session is built.
    pub fn with_constraints(mut self, constraints: Vec<ParameterConstraint>) -> Self {
        self.constraints = constraints;
        self
    }

    /// Attach parameter names.
    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Attach closed-form partial derivatives.
    pub fn with_derivatives<D>(mut self, derivative_fn: D) -> Self
    where
        D: Fn(&Array1<f64>, f64, ArrayViewMut1<'_, f64>) + Send + Sync + 'static,
    {
        self.derivative_fn = Some(Box::new(derivative_fn));
        self
    }
}

impl Model for FnModel {
    fn parameter_count(&self) -> usize {
        self.initial.len()
    }

    fn initial_parameters(&self) -> Array1<f64> {
        self.initial.clone()
    }

    fn constraints(&self) -> Vec<ParameterConstraint> {
        self.constraints.clone()
    }

    fn parameter_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn eval(&self, params: &Array1<f64>, x: f64) -> f64 {
        (self.eval_fn)(params, x)
    }

    fn derivative(&self) -> Option<&dyn ModelDerivative> {
        match self.derivative_fn {
            Some(_) => Some(self),
            None => None,
        }
    }
}

impl ModelDerivative for FnModel {
    fn eval_derivatives(&self, params: &Array1<f64>, x: f64, mut out: ArrayViewMut1<'_, f64>) {
        match &self.derivative_fn {
            Some(derivative_fn) => derivative_fn(params, x, out),
            None => out.fill(0.0),
        }
    }
}
