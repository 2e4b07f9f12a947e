//! Adaptive forward differences for models without closed-form derivatives.
//!
//! Each (point, parameter) pair is refined on its own: the perturbation
//! starts at [`INITIAL_STEP`] and shrinks by [`SHRINK_FACTOR`] per round
//! until the quotient settles.

use crate::model::Model;
use ndarray::Array1;

/// First perturbation applied to a parameter.
pub const INITIAL_STEP: f64 = 1.0;

/// Divisor applied to the perturbation after every round.
pub const SHRINK_FACTOR: f64 = 1.1;

/// Default convergence threshold for the quotient change and the step size.
pub const DEFAULT_THRESHOLD: f64 = 1e-4;

/// Estimate ∂f/∂p[index] at `x` with a shrinking forward difference.
///
/// `scratch` must hold the parameters to differentiate at; its entry
/// `index` is perturbed during the search and restored bit-for-bit before
/// returning. `base` is the model value at the unperturbed parameters.
///
/// Refinement stops when
/// - the quotient changes by less than `threshold` between rounds, or
/// - the step drops below `threshold`, or
/// - the truncation error estimate `|Δq| / (SHRINK_FACTOR - 1)` stops
///   shrinking, in which case the previous quotient is returned, or
/// - the raw difference is zero or non-finite, in which case the last
///   stable quotient is returned (zero if no round completed).
///
/// # Arguments
///
/// * `model` - The model to differentiate
/// * `scratch` - Parameter values, temporarily perturbed in place
/// * `index` - The parameter to differentiate with respect to
/// * `x` - The sample point
/// * `base` - `model.eval(scratch, x)` before perturbation
/// * `threshold` - Convergence threshold for both quotient change and step
///
/// # Returns
///
/// * The derivative estimate
pub fn forward_difference<M: Model + ?Sized>(
    model: &M,
    scratch: &mut Array1<f64>,
    index: usize,
    x: f64,
    base: f64,
    threshold: f64,
) -> f64 {
    let original = scratch[index];
    let mut step = INITIAL_STEP;
    let mut stable = 0.0;
    let mut previous: Option<f64> = None;
    let mut previous_error = f64::INFINITY;

    loop {
        scratch[index] = original + step;
        let diff = model.eval(scratch, x) - base;
        scratch[index] = original;

        if diff == 0.0 || !diff.is_finite() {
            break;
        }

        let quotient = diff / step;
        match previous {
            None => stable = quotient,
            Some(prev) => {
                let change = (quotient - prev).abs();
                let error = change / (SHRINK_FACTOR - 1.0);
                if error >= previous_error {
                    break;
                }
                stable = quotient;
                previous_error = error;
                if change < threshold {
                    break;
                }
            }
        }

        if step < threshold {
            break;
        }
        previous = Some(quotient);
        step /= SHRINK_FACTOR;
    }

    stable
}

/// Estimate ∂f/∂p[index] at `x` without a caller-provided scratch buffer.
///
/// Convenience wrapper around [`forward_difference`] that copies `params`.
pub fn derivative<M: Model + ?Sized>(
    model: &M,
    params: &Array1<f64>,
    index: usize,
    x: f64,
    threshold: f64,
) -> f64 {
    let mut scratch = params.clone();
    let base = model.eval(params, x);
    forward_difference(model, &mut scratch, index, x, base, threshold)
}
