//! Implementation of the Levenberg-Marquardt fit loop.
//!
//! A [`FitSession`] owns every buffer a fit needs, sized once when the
//! session is built. Each iteration evaluates the model at the accepted
//! parameters, fills the derivative cache, assembles and solves the damped
//! normal equations, evaluates the trial step and then accepts it (λ / 10) or
//! rejects it (λ × 10).

use std::fmt;

use ndarray::{Array1, Array2};
use tracing::{debug, info, warn};

use crate::error::{FitError, Result};
use crate::model::Model;
use crate::parameters::{enforce, fixed_mask, ParameterConstraint};
use crate::uncertainty::{self, ParameterUncertainties};

use super::config::FitConfig;
use super::convergence::{self, ConvergenceStatus};
use super::jacobian::DerivativeStrategy;
use super::linear_solver::solve_in_place;
use super::normal_equations::{assemble, chi_squared, chi_squared_with_estimates};

/// Summary of a finished fit.
#[derive(Debug, Clone)]
pub struct FitReport {
    /// Parameter names, in parameter order
    pub names: Vec<String>,

    /// Fitted parameter values
    pub params: Array1<f64>,

    /// Which parameters were held
    pub fixed: Vec<bool>,

    /// Sum of squared residuals at `params`
    pub chi_squared: f64,

    /// Final damping value
    pub lambda: f64,

    /// Number of iterations performed
    pub iterations: usize,

    /// Why the fit stopped
    pub status: ConvergenceStatus,

    /// Whether closed-form derivatives were used
    pub analytic_derivatives: bool,
}

impl fmt::Display for FitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fit Result:")?;
        writeln!(f, "  Status: {}", self.status)?;
        writeln!(f, "  Chi-squared: {:.6e}", self.chi_squared)?;
        writeln!(f, "  Lambda: {:.3e}", self.lambda)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(
            f,
            "  Derivatives: {}",
            if self.analytic_derivatives { "analytic" } else { "numerical" }
        )?;
        writeln!(f, "  Parameters:")?;
        for ((name, value), fixed) in self.names.iter().zip(&self.params).zip(&self.fixed) {
            let marker = if *fixed { " (fixed)" } else { "" };
            writeln!(f, "    {:<12} = {:.8e}{}", name, value, marker)?;
        }
        Ok(())
    }
}

/// Builder for a [`FitSession`].
pub struct FitSessionBuilder<'a, M: Model + ?Sized> {
    model: &'a M,
    x: Array1<f64>,
    y: Array1<f64>,
    initial: Option<Array1<f64>>,
    fixed: Vec<usize>,
    config: FitConfig,
}

impl<'a, M: Model + ?Sized> FitSessionBuilder<'a, M> {
    /// Start from the given parameters instead of the model's defaults.
    pub fn with_initial_parameters(mut self, initial: impl Into<Array1<f64>>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    /// Hold the parameters at these indices at their starting values.
    pub fn with_fixed(mut self, indices: &[usize]) -> Self {
        self.fixed = indices.to_vec();
        self
    }

    /// Use the given configuration.
    pub fn with_config(mut self, config: FitConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the inputs and allocate the session's buffers.
    ///
    /// # Errors
    ///
    /// * [`FitError::DimensionMismatch`] if `x` and `y` differ in length
    ///   (checked before anything else), or if the initial parameters or the
    ///   model's constraints do not match its parameter count
    /// * [`FitError::InvalidInput`] for an empty sample set
    /// * [`FitError::InvalidParameter`] for a fixed index out of range
    /// * [`FitError::InvalidConfig`] for unusable configuration values
    pub fn build(self) -> Result<FitSession<'a, M>> {
        let Self {
            model,
            x,
            y,
            initial,
            fixed,
            config,
        } = self;

        if x.len() != y.len() {
            return Err(FitError::DimensionMismatch(format!(
                "x has {} samples, y has {}",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(FitError::InvalidInput(
                "at least one sample is required".to_string(),
            ));
        }
        config.validate()?;

        let n_params = model.parameter_count();
        let mut params = initial.unwrap_or_else(|| model.initial_parameters());
        if params.len() != n_params {
            return Err(FitError::DimensionMismatch(format!(
                "expected {} initial parameters, got {}",
                n_params,
                params.len()
            )));
        }

        let constraints = model.constraints();
        if constraints.len() != n_params {
            return Err(FitError::DimensionMismatch(format!(
                "expected {} parameter constraints, got {}",
                n_params,
                constraints.len()
            )));
        }

        let fixed = fixed_mask(&fixed, n_params)?;
        enforce(&mut params, &constraints, &fixed);

        let strategy = DerivativeStrategy::select(model, config.diff_method);
        let n_points = x.len();
        let chi2 = chi_squared(model, &params, &x, &y);

        debug!(
            n_points,
            n_params,
            analytic = strategy.is_analytic(),
            "fit session built"
        );

        Ok(FitSession {
            model,
            strategy,
            lambda: config.initial_lambda,
            config,
            x,
            y,
            constraints,
            fixed,
            params,
            chi2,
            iterations: 0,
            status: ConvergenceStatus::NotStarted,
            derivs: Array2::zeros((n_points, n_params)),
            hessian: Array2::zeros((n_params, n_params)),
            gradient: Array1::zeros(n_params),
            increment: Array1::zeros(n_params),
            trial: Array1::zeros(n_params),
            scratch: Array1::zeros(n_params),
            estimates: Array1::zeros(n_points),
        })
    }
}

/// One Levenberg-Marquardt fit of a model to a fixed sample set.
///
/// ```
/// use lmcurve::lm::FitSession;
/// use lmcurve::models::PolynomialModel;
/// use ndarray::array;
///
/// let model = PolynomialModel::new(1);
/// let x = array![0.0, 1.0, 2.0, 3.0, 4.0];
/// let y = array![2.0, 5.0, 8.0, 11.0, 14.0];
///
/// let mut session = FitSession::new(&model, x, y).unwrap();
/// session.fit();
///
/// assert!((session.parameters()[0] - 2.0).abs() < 1e-8);
/// assert!((session.parameters()[1] - 3.0).abs() < 1e-8);
/// ```
pub struct FitSession<'a, M: Model + ?Sized> {
    model: &'a M,
    strategy: DerivativeStrategy<'a>,
    config: FitConfig,
    x: Array1<f64>,
    y: Array1<f64>,
    constraints: Vec<ParameterConstraint>,
    fixed: Vec<bool>,

    params: Array1<f64>,
    lambda: f64,
    chi2: f64,
    iterations: usize,
    status: ConvergenceStatus,

    derivs: Array2<f64>,
    hessian: Array2<f64>,
    gradient: Array1<f64>,
    increment: Array1<f64>,
    trial: Array1<f64>,
    scratch: Array1<f64>,
    estimates: Array1<f64>,
}

impl<'a, M: Model + ?Sized> FitSession<'a, M> {
    /// Start building a session for `model` on the samples `x`, `y`.
    pub fn builder(
        model: &'a M,
        x: impl Into<Array1<f64>>,
        y: impl Into<Array1<f64>>,
    ) -> FitSessionBuilder<'a, M> {
        FitSessionBuilder {
            model,
            x: x.into(),
            y: y.into(),
            initial: None,
            fixed: Vec::new(),
            config: FitConfig::default(),
        }
    }

    /// Build a session with the model's initial parameters, nothing held and
    /// the default configuration.
    pub fn new(
        model: &'a M,
        x: impl Into<Array1<f64>>,
        y: impl Into<Array1<f64>>,
    ) -> Result<Self> {
        Self::builder(model, x, y).build()
    }

    /// Run the fit until a stopping condition holds.
    ///
    /// Calling `fit` again resumes from the current parameters and damping
    /// with a fresh iteration count.
    pub fn fit(&mut self) -> ConvergenceStatus {
        let model = self.model;
        let max_iterations = self.config.max_iterations;
        let threshold = self.config.derivative_threshold;

        enforce(&mut self.params, &self.constraints, &self.fixed);
        self.iterations = 0;

        let status = loop {
            // Evaluate
            let current = chi_squared_with_estimates(
                model,
                &self.params,
                &self.x,
                &self.y,
                &mut self.estimates,
            );

            // Differentiate
            self.strategy.fill(
                model,
                &self.params,
                &mut self.scratch,
                &self.x,
                &self.estimates,
                threshold,
                &self.fixed,
                &mut self.derivs,
            );

            // Assemble
            assemble(
                &self.derivs,
                &self.y,
                &self.estimates,
                self.lambda,
                &mut self.hessian,
                &mut self.gradient,
            );

            // Solve
            let rank = solve_in_place(
                &mut self.hessian,
                &mut self.gradient,
                &mut self.increment,
            );
            for (j, trial) in self.trial.iter_mut().enumerate() {
                *trial = if self.fixed[j] {
                    self.params[j]
                } else {
                    self.params[j] + self.increment[j]
                };
            }
            enforce(&mut self.trial, &self.constraints, &self.fixed);

            // Trial evaluate
            let trial_chi2 = chi_squared(model, &self.trial, &self.x, &self.y);
            self.iterations += 1;

            // Decide
            enforce(&mut self.params, &self.constraints, &self.fixed);
            if trial_chi2.is_nan() || (!trial_chi2.is_finite() && !current.is_finite()) {
                self.chi2 = current;
                warn!(
                    iteration = self.iterations,
                    trial_chi2, "non-finite chi-squared, stopping"
                );
                break ConvergenceStatus::NumericalError;
            }

            // An overflowing trial from a finite incumbent is rejected; a NaN
            // current chi-squared accepts any finite trial
            let rejected = trial_chi2 >= current;
            if rejected {
                self.lambda = (self.lambda * 10.0).min(f64::MAX);
                self.chi2 = current;
            } else {
                self.lambda = (self.lambda / 10.0).max(f64::MIN_POSITIVE);
                self.params.assign(&self.trial);
                self.chi2 = trial_chi2;
            }

            debug!(
                iteration = self.iterations,
                chi2 = current,
                trial_chi2,
                lambda = self.lambda,
                rank,
                accepted = !rejected,
                "iteration"
            );

            if let Some(status) = convergence::check(
                current,
                trial_chi2,
                self.iterations,
                max_iterations,
                self.config.min_delta_chi2,
                self.config.relative_delta_chi2,
            ) {
                break status;
            }
        };

        info!(
            iterations = self.iterations,
            chi2 = self.chi2,
            lambda = self.lambda,
            ?status,
            "fit finished"
        );
        self.status = status;
        status
    }

    /// Current best parameters.
    pub fn parameters(&self) -> &Array1<f64> {
        &self.params
    }

    /// Current damping value.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Sum of squared residuals at [`parameters`](Self::parameters).
    pub fn chi_squared(&self) -> f64 {
        self.chi2
    }

    /// Iterations performed by the last `fit` call.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Why the last `fit` call stopped.
    pub fn status(&self) -> ConvergenceStatus {
        self.status
    }

    /// Whether closed-form derivatives are in use.
    pub fn uses_analytic_derivatives(&self) -> bool {
        self.strategy.is_analytic()
    }

    /// The configuration the session was built with.
    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Per-parameter constraints in effect.
    pub fn constraints(&self) -> &[ParameterConstraint] {
        &self.constraints
    }

    /// Held-parameter mask.
    pub fn fixed(&self) -> &[bool] {
        &self.fixed
    }

    /// Number of samples.
    pub fn sample_count(&self) -> usize {
        self.x.len()
    }

    /// Summary of the current state.
    pub fn report(&self) -> FitReport {
        FitReport {
            names: self.model.parameter_names(),
            params: self.params.clone(),
            fixed: self.fixed.clone(),
            chi_squared: self.chi2,
            lambda: self.lambda,
            iterations: self.iterations,
            status: self.status,
            analytic_derivatives: self.strategy.is_analytic(),
        }
    }

    /// Covariance-based uncertainties of the current parameters.
    ///
    /// Uses its own buffers; the session state is not touched.
    pub fn uncertainties(&self) -> Result<ParameterUncertainties> {
        let n_params = self.params.len();
        let mut estimates = Array1::zeros(self.x.len());
        let chi2 =
            chi_squared_with_estimates(self.model, &self.params, &self.x, &self.y, &mut estimates);

        let mut derivs = Array2::zeros((self.x.len(), n_params));
        let mut scratch = Array1::zeros(n_params);
        self.strategy.fill(
            self.model,
            &self.params,
            &mut scratch,
            &self.x,
            &estimates,
            self.config.derivative_threshold,
            &self.fixed,
            &mut derivs,
        );

        uncertainty::calculate(&derivs, chi2, &self.fixed)
    }
}
