//! Piecewise-linear function parameters.

use crate::error::ConfigurationError;

/// A collection of piecewise-linear functions sharing one piece count.
///
/// Parameters are stored flat, group-major, exactly as they arrive from the
/// configuration surface:
///
/// ```text
/// bounds[g * (n_pieces + 1) .. (g + 1) * (n_pieces + 1)]  → group g bounds
/// slopes[g * n_pieces .. (g + 1) * n_pieces]              → group g slopes
/// intercepts[g * n_pieces .. (g + 1) * n_pieces]          → group g intercepts
/// ```
///
/// The group count is implied by the lengths: every group has one more bound
/// than it has slopes, so `n_groups = len(bounds) - len(slopes)`.
///
/// Construction validates lengths and bound ordering; once built the
/// collection is immutable and can be shared freely between threads.
///
/// # Example
///
/// ```
/// use calibrators::repr::PiecewiseParams;
///
/// // One group, two pieces: f(x) = x on (0, 1], 2x - 1 on (1, 2].
/// let params = PiecewiseParams::new(
///     vec![0.0, 1.0, 2.0],
///     vec![1.0, 2.0],
///     vec![0.0, -1.0],
/// )
/// .unwrap();
///
/// assert_eq!(params.n_groups(), 1);
/// assert_eq!(params.n_pieces(), 2);
/// assert_eq!(params.group(0).evaluate(1.5), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseParams {
    bounds: Box<[f32]>,
    slopes: Box<[f32]>,
    intercepts: Box<[f32]>,
    n_groups: usize,
    n_pieces: usize,
}

impl PiecewiseParams {
    /// Build and validate a collection from owned flat buffers.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::NoGroups`] if `bounds` isn't longer than `slopes`
    /// - [`ConfigurationError::LengthMismatch`] if slopes and intercepts differ
    ///   in length or don't split evenly across groups
    /// - [`ConfigurationError::NoPieces`] if groups would have zero pieces
    /// - [`ConfigurationError::NonMonotonicBounds`] if any group's bounds decrease
    pub fn new(
        bounds: Vec<f32>,
        slopes: Vec<f32>,
        intercepts: Vec<f32>,
    ) -> Result<Self, ConfigurationError> {
        if bounds.len() <= slopes.len() {
            return Err(ConfigurationError::NoGroups {
                bounds: bounds.len(),
                slopes: slopes.len(),
            });
        }
        let n_groups = bounds.len() - slopes.len();

        if slopes.len() != intercepts.len() || slopes.len() % n_groups != 0 {
            return Err(ConfigurationError::LengthMismatch {
                bounds: bounds.len(),
                slopes: slopes.len(),
                intercepts: intercepts.len(),
            });
        }

        let n_pieces = slopes.len() / n_groups;
        if n_pieces == 0 {
            return Err(ConfigurationError::NoPieces);
        }

        let params = Self {
            bounds: bounds.into_boxed_slice(),
            slopes: slopes.into_boxed_slice(),
            intercepts: intercepts.into_boxed_slice(),
            n_groups,
            n_pieces,
        };
        params.validate_bounds()?;
        Ok(params)
    }

    /// Build and validate a collection from borrowed flat slices.
    ///
    /// Convenience wrapper over [`new`](Self::new) for parameters read out of
    /// input buffers.
    pub fn from_slices(
        bounds: &[f32],
        slopes: &[f32],
        intercepts: &[f32],
    ) -> Result<Self, ConfigurationError> {
        Self::new(bounds.to_vec(), slopes.to_vec(), intercepts.to_vec())
    }

    fn validate_bounds(&self) -> Result<(), ConfigurationError> {
        for (group, function) in self.groups().enumerate() {
            for (index, pair) in function.bounds().windows(2).enumerate() {
                // Written as a negation so NaN bounds are rejected too.
                if !(pair[0] <= pair[1]) {
                    return Err(ConfigurationError::NonMonotonicBounds {
                        group,
                        index,
                        low: pair[0],
                        high: pair[1],
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of function groups.
    #[inline]
    pub fn n_groups(&self) -> usize {
        self.n_groups
    }

    /// Number of linear pieces per group.
    #[inline]
    pub fn n_pieces(&self) -> usize {
        self.n_pieces
    }

    /// Flat bounds, `n_groups * (n_pieces + 1)` values.
    #[inline]
    pub fn bounds(&self) -> &[f32] {
        &self.bounds
    }

    /// Flat slopes, `n_groups * n_pieces` values.
    #[inline]
    pub fn slopes(&self) -> &[f32] {
        &self.slopes
    }

    /// Flat intercepts, `n_groups * n_pieces` values.
    #[inline]
    pub fn intercepts(&self) -> &[f32] {
        &self.intercepts
    }

    /// Borrow a single group.
    ///
    /// # Panics
    ///
    /// Panics if `group >= n_groups()`.
    #[inline]
    pub fn group(&self, group: usize) -> PiecewiseFunction<'_> {
        assert!(
            group < self.n_groups,
            "group {} out of range for {} groups",
            group,
            self.n_groups
        );
        let n_bounds = self.n_pieces + 1;
        let pieces = group * self.n_pieces..(group + 1) * self.n_pieces;
        PiecewiseFunction {
            bounds: &self.bounds[group * n_bounds..(group + 1) * n_bounds],
            slopes: &self.slopes[pieces.clone()],
            intercepts: &self.intercepts[pieces],
        }
    }

    /// Iterate over all groups in order.
    pub fn groups(&self) -> impl ExactSizeIterator<Item = PiecewiseFunction<'_>> + '_ {
        (0..self.n_groups).map(move |g| self.group(g))
    }

    /// Find internal boundaries where adjacent pieces disagree.
    ///
    /// A boundary is reported when the two pieces meeting there differ by more
    /// than `tolerance * max(1, |left|, |right|)`.
    pub fn discontinuities(&self, tolerance: f32) -> Vec<Discontinuity> {
        let mut found = Vec::new();
        for (group, function) in self.groups().enumerate() {
            for boundary in 1..function.n_pieces() {
                let x = function.bounds[boundary];
                let left = function.slopes[boundary - 1] * x + function.intercepts[boundary - 1];
                let right = function.slopes[boundary] * x + function.intercepts[boundary];
                let scale = 1.0f32.max(left.abs()).max(right.abs());
                if !((left - right).abs() <= tolerance * scale) {
                    found.push(Discontinuity {
                        group,
                        boundary,
                        x,
                        left,
                        right,
                    });
                }
            }
        }
        found
    }

    /// Fail with the first discontinuity, if any.
    pub fn check_continuity(&self, tolerance: f32) -> Result<(), ConfigurationError> {
        match self.discontinuities(tolerance).into_iter().next() {
            Some(d) => Err(d.into()),
            None => Ok(()),
        }
    }
}

/// One piecewise-linear function: a borrowed view into a [`PiecewiseParams`] group.
///
/// Piece `k` covers `(bounds[k], bounds[k + 1]]`. Inputs at or below
/// `bounds[0]` and above `bounds[n_pieces]` are clamped onto the outer pieces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiecewiseFunction<'a> {
    pub(crate) bounds: &'a [f32],
    pub(crate) slopes: &'a [f32],
    pub(crate) intercepts: &'a [f32],
}

impl<'a> PiecewiseFunction<'a> {
    /// Piece boundaries, `n_pieces + 1` values.
    #[inline]
    pub fn bounds(&self) -> &'a [f32] {
        self.bounds
    }

    #[inline]
    pub fn slopes(&self) -> &'a [f32] {
        self.slopes
    }

    #[inline]
    pub fn intercepts(&self) -> &'a [f32] {
        self.intercepts
    }

    #[inline]
    pub fn n_pieces(&self) -> usize {
        self.slopes.len()
    }

    /// Lower clamp bound.
    #[inline]
    pub fn lower(&self) -> f32 {
        self.bounds[0]
    }

    /// Upper clamp bound.
    #[inline]
    pub fn upper(&self) -> f32 {
        self.bounds[self.bounds.len() - 1]
    }
}

/// A boundary where two adjacent pieces don't meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discontinuity {
    /// Function group.
    pub group: usize,
    /// Index into the group's bounds (always internal: `0 < boundary < n_pieces`).
    pub boundary: usize,
    /// Bound value where the pieces meet.
    pub x: f32,
    /// Value of piece `boundary - 1` at `x`.
    pub left: f32,
    /// Value of piece `boundary` at `x`.
    pub right: f32,
}

impl From<Discontinuity> for ConfigurationError {
    fn from(d: Discontinuity) -> Self {
        ConfigurationError::Discontinuous {
            group: d.group,
            boundary: d.boundary,
            x: d.x,
            left: d.left,
            right: d.right,
        }
    }
}
