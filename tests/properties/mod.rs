//! Property-based tests.

mod fitting;
mod linear_algebra;
