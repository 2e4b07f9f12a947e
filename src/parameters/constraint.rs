//! Per-parameter domain constraints.
//!
//! Constraints are never reported as errors. A value outside its domain is
//! pulled back into it by [`enforce`], which the fit loop runs on every
//! trial vector and on the accepted parameters each iteration.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Value a `Positive` parameter is reset to when it drops to zero or below.
pub const POSITIVE_FLOOR: f64 = 1e-10;

/// Domain restriction attached to one parameter position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParameterConstraint {
    /// Any real value.
    #[default]
    None,

    /// Strictly greater than zero.
    Positive,

    /// Greater than or equal to zero.
    NonNegative,

    /// Whole numbers only.
    Integer,
}

impl ParameterConstraint {
    /// Map `value` into the constrained domain.
    ///
    /// # Examples
    ///
    /// ```
    /// use lmcurve::parameters::{ParameterConstraint, POSITIVE_FLOOR};
    ///
    /// assert_eq!(ParameterConstraint::Positive.apply(-3.0), POSITIVE_FLOOR);
    /// assert_eq!(ParameterConstraint::NonNegative.apply(-0.5), 0.0);
    /// assert_eq!(ParameterConstraint::Integer.apply(2.6), 3.0);
    /// assert_eq!(ParameterConstraint::None.apply(-7.25), -7.25);
    /// ```
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::None => value,
            Self::Positive if value <= 0.0 => POSITIVE_FLOOR,
            Self::NonNegative if value < 0.0 => 0.0,
            Self::Integer => value.round(),
            _ => value,
        }
    }

    /// Whether `value` already lies inside the domain.
    pub fn is_satisfied_by(self, value: f64) -> bool {
        match self {
            Self::None => true,
            Self::Positive => value > 0.0,
            Self::NonNegative => value >= 0.0,
            Self::Integer => value == value.round(),
        }
    }
}

/// Clamp or round every free parameter into its domain.
///
/// Positions marked in `fixed` are left untouched so that held parameters
/// keep their exact starting value.
pub fn enforce(params: &mut Array1<f64>, constraints: &[ParameterConstraint], fixed: &[bool]) {
    for ((value, constraint), &is_fixed) in params.iter_mut().zip(constraints).zip(fixed) {
        if !is_fixed {
            *value = constraint.apply(*value);
        }
    }
}
