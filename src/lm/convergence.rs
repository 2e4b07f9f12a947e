//! Stopping conditions of the fit loop.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Possible states of a fit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// `fit` has not run yet.
    NotStarted,

    /// The chi-squared change dropped below `min_delta_chi2`.
    DeltaChi2,

    /// The relative chi-squared change dropped below `relative_delta_chi2`.
    RelativeDeltaChi2,

    /// The iteration cap was reached.
    MaxIterationsReached,

    /// A trial step produced a NaN chi-squared, or the fit never left the
    /// non-finite region.
    NumericalError,
}

impl ConvergenceStatus {
    /// Returns true if the fit has run to a stop.
    pub fn is_terminated(&self) -> bool {
        !matches!(self, ConvergenceStatus::NotStarted)
    }

    /// Returns true if the fit stopped on a chi-squared criterion.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            ConvergenceStatus::DeltaChi2 | ConvergenceStatus::RelativeDeltaChi2
        )
    }

    /// Returns a description of the status.
    pub fn description(&self) -> &'static str {
        match self {
            ConvergenceStatus::NotStarted => "Fit has not been run",
            ConvergenceStatus::DeltaChi2 => "Converged: chi-squared change below threshold",
            ConvergenceStatus::RelativeDeltaChi2 => {
                "Converged: relative chi-squared change below threshold"
            }
            ConvergenceStatus::MaxIterationsReached => "Terminated: maximum iterations reached",
            ConvergenceStatus::NumericalError => "Terminated: non-finite chi-squared",
        }
    }
}

impl fmt::Display for ConvergenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Decide whether the loop stops after an iteration.
///
/// `iterations` counts completed iterations, including this one. Returns
/// `None` when the loop should continue.
pub(crate) fn check(
    current_chi2: f64,
    trial_chi2: f64,
    iterations: usize,
    max_iterations: usize,
    min_delta_chi2: f64,
    relative_delta_chi2: f64,
) -> Option<ConvergenceStatus> {
    let delta = (current_chi2 - trial_chi2).abs();
    if delta < min_delta_chi2 {
        return Some(ConvergenceStatus::DeltaChi2);
    }
    if delta / current_chi2.max(1e-10) < relative_delta_chi2 {
        return Some(ConvergenceStatus::RelativeDeltaChi2);
    }
    if iterations >= max_iterations {
        return Some(ConvergenceStatus::MaxIterationsReached);
    }
    None
}
