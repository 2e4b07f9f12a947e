//! # Parameter constraints
//!
//! Every model parameter carries a [`ParameterConstraint`] describing its
//! domain, and a fit may hold any subset of parameters at their starting
//! value.
//!
//! ```rust
//! use lmcurve::parameters::{enforce, fixed_mask, ParameterConstraint};
//! use ndarray::array;
//!
//! let constraints = [ParameterConstraint::Positive, ParameterConstraint::Integer];
//! let fixed = fixed_mask(&[], 2).unwrap();
//!
//! let mut params = array![-0.3, 4.4];
//! enforce(&mut params, &constraints, &fixed);
//! assert_eq!(params, array![1e-10, 4.0]);
//! ```

pub mod constraint;
pub mod fixed;

pub use constraint::{enforce, ParameterConstraint, POSITIVE_FLOOR};
pub use fixed::fixed_mask;
