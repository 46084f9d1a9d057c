//! calibrators: Piecewise-linear calibration of model predictions.
//!
//! Remaps raw prediction scores (e.g. probabilities) onto a calibrated scale
//! with externally fitted piecewise-linear functions, one per prediction
//! column, or a single shared function for binary classification.
//!
//! # Key Types
//!
//! - [`PiecewiseLinearTransform`] / [`TransformConfig`] - Configured operator and its arguments
//! - [`PiecewiseParams`] / [`PiecewiseFunction`] - Validated function parameters
//! - [`Transformer`] / [`BinaryAdapter`] - Batch evaluators
//!
//! # Semantics
//!
//! Piece `k` of a function covers `(bounds[k], bounds[k + 1]]`. Values at or
//! below the first bound, or above the last, are clamped to that bound and
//! evaluated on the outer piece. In binary mode the positive column is
//! transformed and the negative column becomes its complement.
//!
//! # Example
//!
//! ```
//! use calibrators::{PiecewiseLinearTransform, TransformConfig};
//! use ndarray::array;
//!
//! let config = TransformConfig::builder()
//!     .bounds(vec![0.0, 1.0, 2.0])
//!     .slopes(vec![1.0, 2.0])
//!     .intercepts(vec![0.0, -1.0])
//!     .binary(true)
//!     .build()
//!     .unwrap();
//! let op = PiecewiseLinearTransform::new(config).unwrap();
//!
//! let out = op.transform(array![[0.7, 0.3]].view()).unwrap();
//! assert!((out[[0, 0]] - 0.7).abs() < 1e-6);
//! assert!((out[[0, 1]] - 0.3).abs() < 1e-6);
//! ```

pub mod error;
pub mod inference;
pub mod model;
pub mod repr;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use error::{ConfigurationError, ShapeError, TransformError};
pub use inference::{BatchTransform, BinaryAdapter, Transformer};
pub use model::{ContinuityCheck, ParameterSource, PiecewiseLinearTransform, TransformConfig};
pub use repr::{PiecewiseFunction, PiecewiseParams};
pub use utils::Parallelism;
