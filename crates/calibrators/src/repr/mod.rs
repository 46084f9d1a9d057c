//! Parameter representations.
//!
//! [`PiecewiseParams`] owns the validated breakpoints of every function group;
//! [`PiecewiseFunction`] is a cheap borrowed view of one group.

mod piecewise;

pub use piecewise::{Discontinuity, PiecewiseFunction, PiecewiseParams};
