//! # lmcurve
//!
//! `lmcurve` fits parametric scalar models `y = f(x; p)` to sampled data by
//! minimising the sum of squared residuals with the Levenberg-Marquardt
//! method.
//!
//! The library provides:
//! - A [`Model`] trait with optional closed-form derivatives, and adaptive
//!   forward differences for models without them
//! - Per-parameter domain constraints and held (fixed) parameters
//! - A [`FitSession`] that owns every working buffer of a fit
//! - Built-in polynomial, exponential, Gaussian and sigmoid models
//! - Covariance-based parameter uncertainties
//!
//! ## Basic Usage
//!
//! ```
//! use lmcurve::{FitConfig, FitSession};
//! use lmcurve::models::ExponentialModel;
//! use ndarray::{array, Array1};
//!
//! let model = ExponentialModel::new();
//! let x = Array1::linspace(0.0, 3.0, 16);
//! let y = x.mapv(|x_val: f64| 2.5 * (-x_val / 1.2).exp());
//!
//! let mut session = FitSession::builder(&model, x, y)
//!     .with_initial_parameters(array![1.0, 1.0])
//!     .with_config(FitConfig::default().with_max_iterations(200))
//!     .build()
//!     .unwrap();
//! let status = session.fit();
//!
//! assert!(status.is_terminated());
//! assert!((session.parameters()[0] - 2.5).abs() < 1e-6);
//! assert!((session.parameters()[1] - 1.2).abs() < 1e-6);
//! ```

pub mod error;
pub mod lm;
pub mod model;
pub mod models;
pub mod parameters;
pub mod uncertainty;
pub mod utils;

// Re-exports for convenience
pub use error::{FitError, Result};
pub use lm::{ConvergenceStatus, DiffMethod, FitConfig, FitReport, FitSession};
pub use model::{FnModel, Model, ModelDerivative};
pub use parameters::ParameterConstraint;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
