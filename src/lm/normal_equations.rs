//! Chi-squared and the damped normal equations.
//!
//! With D the derivative cache and r = y - ŷ the residuals, the system
//! solved each iteration is
//!
//! ```text
//! H Δp = g,   g[r] = Σᵢ rᵢ Dᵢᵣ,   H[r][c] = Σᵢ Dᵢᵣ Dᵢc (r ≠ c),   H[r][r] = (1 + λ) Σᵢ Dᵢᵣ²
//! ```
//!
//! i.e. Levenberg's multiplicative damping of the diagonal.

use ndarray::{Array1, Array2};

use crate::model::Model;

/// Sum of squared residuals of `model` at `params`.
pub fn chi_squared<M: Model + ?Sized>(
    model: &M,
    params: &Array1<f64>,
    x: &Array1<f64>,
    y: &Array1<f64>,
) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(&x_val, &y_val)| {
            let r = y_val - model.eval(params, x_val);
            r * r
        })
        .sum()
}

/// Like [`chi_squared`], also storing each model value in `estimates`.
pub fn chi_squared_with_estimates<M: Model + ?Sized>(
    model: &M,
    params: &Array1<f64>,
    x: &Array1<f64>,
    y: &Array1<f64>,
    estimates: &mut Array1<f64>,
) -> f64 {
    let mut chi2 = 0.0;
    for ((estimate, &x_val), &y_val) in estimates.iter_mut().zip(x).zip(y) {
        *estimate = model.eval(params, x_val);
        let r = y_val - *estimate;
        chi2 += r * r;
    }
    chi2
}

/// Build the damped Hessian and gradient in place.
///
/// # Arguments
///
/// * `derivs` - Derivative cache, N rows by P columns
/// * `y` - Observed values
/// * `estimates` - Model values at the current parameters
/// * `lambda` - Damping factor
/// * `hessian` - Output, P by P
/// * `gradient` - Output, length P
pub fn assemble(
    derivs: &Array2<f64>,
    y: &Array1<f64>,
    estimates: &Array1<f64>,
    lambda: f64,
    hessian: &mut Array2<f64>,
    gradient: &mut Array1<f64>,
) {
    let n_params = derivs.ncols();

    for r in 0..n_params {
        let column = derivs.column(r);
        gradient[r] = column
            .iter()
            .zip(y.iter().zip(estimates))
            .map(|(&d, (&y_val, &estimate))| (y_val - estimate) * d)
            .sum();

        hessian[[r, r]] = column.dot(&column) * (1.0 + lambda);
        for c in (r + 1)..n_params {
            let value = column.dot(&derivs.column(c));
            hessian[[r, c]] = value;
            hessian[[c, r]] = value;
        }
    }
}
