//! Levenberg-Marquardt curve fitting.
//!
//! The fit loop lives in [`algorithm`]; the remaining modules are its pieces:
//! derivative cache construction ([`jacobian`]), the damped normal equations
//! ([`normal_equations`]), the dense solver ([`linear_solver`]) and the
//! stopping rules ([`convergence`]).

pub mod algorithm;
pub mod config;
pub mod convergence;
pub mod jacobian;
pub mod linear_solver;
pub mod normal_equations;
#[cfg(feature = "parallel")]
pub mod parallel;

pub use algorithm::{FitReport, FitSession, FitSessionBuilder};
pub use config::{DiffMethod, FitConfig};
pub use convergence::ConvergenceStatus;
pub use jacobian::DerivativeStrategy;
#[cfg(feature = "parallel")]
pub use parallel::fit_batch;
