//! Evaluation of piecewise-linear calibration over prediction batches.
//!
//! - [`find_piece`]: binary-search piece lookup for a single value
//! - [`Transformer`]: one function group per column
//! - [`BinaryAdapter`]: one group shared by `[negative, positive]` columns
//! - [`BatchTransform`]: common interface of the two batch evaluators

mod binary;
mod lookup;
mod transformer;

pub use binary::BinaryAdapter;
pub use lookup::find_piece;
pub use transformer::{BatchTransform, Transformer};
