//! # Covariance Matrix Calculations
//!
//! Covariance and correlation matrices from the derivative cache of a
//! finished fit.

use ndarray::{Array1, Array2};

use crate::error::{FitError, Result};
use crate::lm::linear_solver::solve_in_place;

/// Calculate the covariance matrix from the derivative cache.
///
/// For nonlinear least-squares problems, the covariance matrix is estimated as:
///   covar = redchi * inv(J^T * J)
/// where:
///   - J is the derivative cache with held columns zeroed
///   - redchi is the reduced chi-square (chi^2 / dof)
///
/// Rows and columns of held parameters are zero.
///
/// # Errors
///
/// * [`FitError::SingularMatrix`] if J^T * J restricted to the free
///   parameters is not invertible
pub fn calculate_covariance(
    derivs: &Array2<f64>,
    redchi: f64,
    fixed: &[bool],
) -> Result<Array2<f64>> {
    let jtj = derivs.t().dot(derivs);
    let n = jtj.nrows();
    let n_free = fixed.iter().filter(|&&is_fixed| !is_fixed).count();

    let mut covar = Array2::zeros((n, n));
    let mut matrix = Array2::zeros((n, n));
    let mut rhs = Array1::zeros(n);
    let mut column = Array1::zeros(n);

    // One solve per free unit vector
    for k in (0..n).filter(|&k| !fixed[k]) {
        matrix.assign(&jtj);
        rhs.fill(0.0);
        rhs[k] = 1.0;

        let rank = solve_in_place(&mut matrix, &mut rhs, &mut column);
        if rank < n_free {
            return Err(FitError::SingularMatrix);
        }

        covar.column_mut(k).assign(&column);
    }

    covar.mapv_inplace(|c| c * redchi);
    Ok(covar)
}

/// Calculate correlation matrix from covariance matrix.
///
/// The correlation matrix is calculated as:
///   correl[i,j] = covar[i,j] / sqrt(covar[i,i] * covar[j,j])
///
/// Entries involving a parameter with zero variance are zero, apart from the
/// unit diagonal.
pub fn calculate_correlation(covar: &Array2<f64>) -> Array2<f64> {
    let n = covar.nrows();
    let mut correl = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..n {
            if i == j {
                correl[[i, j]] = 1.0;
            } else {
                let denom = (covar[[i, i]] * covar[[j, j]]).sqrt();
                if denom > 0.0 {
                    correl[[i, j]] = covar[[i, j]] / denom;
                }
            }
        }
    }

    correl
}

/// Extract standard errors from the covariance matrix.
///
/// Standard errors are the square roots of the diagonal elements
/// of the covariance matrix.
pub fn standard_errors_from_covariance(covar: &Array2<f64>) -> Array1<f64> {
    covar
        .diag()
        .mapv(|variance| if variance > 0.0 { variance.sqrt() } else { 0.0 })
}
