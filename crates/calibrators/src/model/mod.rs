//! High-level operator API.
//!
//! - [`TransformConfig`]: operator arguments, built with a validating builder
//! - [`ParameterSource`]: static vs. per-call parameters, resolved once
//! - [`PiecewiseLinearTransform`]: the configured operator
//!
//! # Example
//!
//! ```
//! use calibrators::model::{PiecewiseLinearTransform, TransformConfig};
//! use ndarray::array;
//!
//! // Parameters passed with every batch
//! let op = PiecewiseLinearTransform::new(TransformConfig::default()).unwrap();
//! let out = op
//!     .transform_with(
//!         array![[0.25, 0.5]].view(),
//!         &[0.0, 1.0, 0.0, 1.0],
//!         &[2.0, 0.5],
//!         &[0.0, 0.0],
//!     )
//!     .unwrap();
//! assert_eq!(out, array![[0.5, 0.25]]);
//! ```

mod config;
mod source;
mod transform;

pub use config::{ContinuityCheck, TransformConfig, DEFAULT_CONTINUITY_TOLERANCE};
pub use source::{check_params, ParameterInputs, ParameterSource};
pub use transform::PiecewiseLinearTransform;
