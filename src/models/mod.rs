//! Built-in model implementations for common fitting problems.
//!
//! Polynomial, exponential and Gaussian models supply closed-form
//! derivatives; the sigmoid model is differentiated numerically.

mod exponential;
mod peak;
mod polynomial;
mod step;

pub use exponential::ExponentialModel;
pub use peak::GaussianModel;
pub use polynomial::PolynomialModel;
pub use step::SigmoidModel;
