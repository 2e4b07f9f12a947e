//! # Uncertainty Calculation
//!
//! Parameter uncertainties of a finished fit, estimated from the undamped
//! normal matrix at the fitted parameters:
//!
//! - Covariance matrix of the free parameters
//! - Correlation matrix
//! - Standard errors and reduced chi-square
//!
//! Held parameters have zero variance.

mod covariance;

pub use covariance::{
    calculate_correlation, calculate_covariance, standard_errors_from_covariance,
};

use ndarray::{Array1, Array2};

use crate::error::{FitError, Result};

/// Structure to hold uncertainty calculation results.
#[derive(Debug, Clone)]
pub struct ParameterUncertainties {
    /// Covariance matrix for the parameters
    pub covariance: Array2<f64>,

    /// Correlation matrix for the parameters
    pub correlation: Array2<f64>,

    /// Standard error of each parameter, in parameter order
    pub standard_errors: Array1<f64>,

    /// Chi-square divided by the degrees of freedom
    pub reduced_chi_squared: f64,

    /// Number of samples minus number of free parameters
    pub degrees_of_freedom: usize,
}

/// Calculate uncertainties from the derivative cache at the fitted parameters.
///
/// # Arguments
///
/// * `derivs` - Derivative cache, one row per sample, held columns zeroed
/// * `chi2` - Chi-square at the fitted parameters
/// * `fixed` - Held-parameter mask
///
/// # Errors
///
/// * [`FitError::InvalidInput`] when there are no degrees of freedom left
/// * [`FitError::SingularMatrix`] when the free parameters are not
///   identifiable from the data
pub fn calculate(
    derivs: &Array2<f64>,
    chi2: f64,
    fixed: &[bool],
) -> Result<ParameterUncertainties> {
    let n_points = derivs.nrows();
    let n_free = fixed.iter().filter(|&&is_fixed| !is_fixed).count();

    if n_points <= n_free {
        return Err(FitError::InvalidInput(format!(
            "{} samples leave no degrees of freedom for {} free parameters",
            n_points, n_free
        )));
    }

    let degrees_of_freedom = n_points - n_free;
    let reduced_chi_squared = chi2 / degrees_of_freedom as f64;

    let covariance = calculate_covariance(derivs, reduced_chi_squared, fixed)?;
    let correlation = calculate_correlation(&covariance);
    let standard_errors = standard_errors_from_covariance(&covariance);

    Ok(ParameterUncertainties {
        covariance,
        correlation,
        standard_errors,
        reduced_chi_squared,
        degrees_of_freedom,
    })
}
