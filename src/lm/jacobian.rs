//! Derivative cache construction.
//!
//! The strategy is chosen once per session: closed-form derivatives when the
//! model offers them (and the configuration allows it), adaptive forward
//! differences otherwise.

use ndarray::{Array1, Array2};
use tracing::trace;

use crate::model::{Model, ModelDerivative};
use crate::utils::finite_difference::forward_difference;

use super::config::DiffMethod;

/// How the derivative cache is filled.
#[derive(Clone, Copy)]
pub enum DerivativeStrategy<'a> {
    /// Call the model's closed-form derivatives once per point.
    Analytic(&'a dyn ModelDerivative),

    /// Adaptive forward differences per point and parameter.
    Numerical,
}

impl std::fmt::Debug for DerivativeStrategy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DerivativeStrategy::Analytic(_) => f.write_str("Analytic"),
            DerivativeStrategy::Numerical => f.write_str("Numerical"),
        }
    }
}

impl<'a> DerivativeStrategy<'a> {
    /// Pick the strategy for `model` under `method`.
    pub fn select<M: Model + ?Sized>(model: &'a M, method: DiffMethod) -> Self {
        match (method, model.derivative()) {
            (DiffMethod::Auto, Some(derivative)) => DerivativeStrategy::Analytic(derivative),
            _ => DerivativeStrategy::Numerical,
        }
    }

    /// Returns true for closed-form derivatives.
    pub fn is_analytic(&self) -> bool {
        matches!(self, DerivativeStrategy::Analytic(_))
    }

    /// Fill `derivs[i, j]` with ∂f(x[i])/∂p[j] and zero the fixed columns.
    ///
    /// # Arguments
    ///
    /// * `model` - The model being fit
    /// * `params` - The parameters to differentiate at
    /// * `scratch` - Work vector of the same length as `params`
    /// * `x` - Sample positions
    /// * `estimates` - `model.eval(params, x[i])` for every point
    /// * `threshold` - Numerical derivative threshold
    /// * `fixed` - Held-parameter mask
    /// * `derivs` - Output, one row per point and one column per parameter
    #[allow(clippy::too_many_arguments)]
    pub fn fill<M: Model + ?Sized>(
        &self,
        model: &M,
        params: &Array1<f64>,
        scratch: &mut Array1<f64>,
        x: &Array1<f64>,
        estimates: &Array1<f64>,
        threshold: f64,
        fixed: &[bool],
        derivs: &mut Array2<f64>,
    ) {
        match self {
            DerivativeStrategy::Analytic(derivative) => {
                for (i, &x_val) in x.iter().enumerate() {
                    derivative.eval_derivatives(params, x_val, derivs.row_mut(i));
                }
            }
            DerivativeStrategy::Numerical => {
                scratch.assign(params);
                for (i, &x_val) in x.iter().enumerate() {
                    for (j, &is_fixed) in fixed.iter().enumerate() {
                        if !is_fixed {
                            derivs[[i, j]] = forward_difference(
                                model,
                                scratch,
                                j,
                                x_val,
                                estimates[i],
                                threshold,
                            );
                        }
                    }
                }
            }
        }

        for (j, &is_fixed) in fixed.iter().enumerate() {
            if is_fixed {
                derivs.column_mut(j).fill(0.0);
            }
        }

        trace!(strategy = ?self, "derivative cache filled");
    }
}
