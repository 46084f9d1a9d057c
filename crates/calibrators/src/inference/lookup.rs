//! Piece lookup and scalar evaluation.
//!
//! Piece `k` covers the half-open interval `(bounds[k], bounds[k + 1]]`: the
//! low bound is excluded and the high bound included. Inputs outside
//! `[bounds[0], bounds[n_pieces]]` are clamped to the nearest outer bound and
//! evaluated on the outer piece.

use crate::repr::PiecewiseFunction;

/// Index of the piece that evaluates `x`, clamping outside the bounds.
///
/// Uses binary search over the bounds, so lookup is `O(log n_pieces)`.
/// `bounds` must be non-decreasing and hold at least two values.
///
/// NaN inputs map to piece 0; [`PiecewiseFunction::evaluate`] handles them
/// before calling this.
#[inline]
pub fn find_piece(bounds: &[f32], x: f32) -> usize {
    debug_assert!(bounds.len() >= 2, "need at least one piece");
    let n_pieces = bounds.len() - 1;
    // First bound >= x; the piece ends at that bound.
    let upper = bounds.partition_point(|&b| b < x);
    upper.clamp(1, n_pieces) - 1
}

impl PiecewiseFunction<'_> {
    /// Evaluate the function at `x`.
    ///
    /// `x <= lower()` evaluates piece 0 at `lower()`; `x > upper()` evaluates
    /// the last piece at `upper()`. NaN propagates.
    #[inline]
    pub fn evaluate(&self, x: f32) -> f32 {
        if x.is_nan() {
            return x;
        }
        let last = self.n_pieces() - 1;
        if x <= self.lower() {
            return self.slopes[0] * self.lower() + self.intercepts[0];
        }
        if x > self.upper() {
            return self.slopes[last] * self.upper() + self.intercepts[last];
        }
        let k = find_piece(self.bounds, x);
        self.slopes[k] * x + self.intercepts[k]
    }
}
