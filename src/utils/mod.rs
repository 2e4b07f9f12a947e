//! Utility functions and helpers for the lmcurve library.

pub mod finite_difference;

pub use finite_difference::{derivative, forward_difference};
