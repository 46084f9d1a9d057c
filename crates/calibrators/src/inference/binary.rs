//! Binary classification: one function shared by complementary columns.
//!
//! Binary predictions arrive either as `Nx1` (positive-class scores) or as
//! `Nx2` (`[negative, positive]`, assumed to sum to one). Only the positive
//! column is calibrated; the negative column is rebuilt as its complement so
//! the output rows still sum to one.

use ndarray::{s, ArrayView2, ArrayViewMut2};

use super::transformer::{check_output_shape, BatchTransform, Transformer};
use crate::error::{ConfigurationError, ShapeError};
use crate::repr::PiecewiseParams;
use crate::utils::Parallelism;

/// Applies a single-group [`Transformer`] to the positive column of binary predictions.
///
/// # Example
///
/// ```
/// use calibrators::inference::{BatchTransform, BinaryAdapter};
/// use calibrators::repr::PiecewiseParams;
/// use ndarray::array;
///
/// let params = PiecewiseParams::new(
///     vec![0.0, 1.0, 2.0],
///     vec![1.0, 2.0],
///     vec![0.0, -1.0],
/// )
/// .unwrap();
///
/// let adapter = BinaryAdapter::new(&params).unwrap();
/// let out = adapter.transform(array![[0.7, 0.3]].view()).unwrap();
/// assert!((out[[0, 0]] - 0.7).abs() < 1e-6);
/// assert!((out[[0, 1]] - 0.3).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BinaryAdapter<'a> {
    inner: Transformer<'a>,
}

impl<'a> BinaryAdapter<'a> {
    /// Wrap `params`, which must hold exactly one function group.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::GroupCount`] if `params` has more than one group.
    pub fn new(params: &'a PiecewiseParams) -> Result<Self, ConfigurationError> {
        if params.n_groups() != 1 {
            return Err(ConfigurationError::GroupCount {
                expected: 1,
                actual: params.n_groups(),
            });
        }
        Ok(Self::single_group(params))
    }

    /// Wrap `params` whose group count was already checked by the caller.
    #[inline]
    pub(crate) fn single_group(params: &'a PiecewiseParams) -> Self {
        debug_assert_eq!(params.n_groups(), 1);
        Self {
            inner: Transformer::new(params),
        }
    }

    /// Set whether rows may be evaluated in parallel.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.inner = self.inner.with_parallelism(parallelism);
        self
    }

    #[inline]
    pub fn parallelism(&self) -> Parallelism {
        self.inner.parallelism()
    }
}

impl BatchTransform for BinaryAdapter<'_> {
    fn transform_into(
        &self,
        predictions: ArrayView2<'_, f32>,
        mut output: ArrayViewMut2<'_, f32>,
    ) -> Result<(), ShapeError> {
        check_output_shape(&predictions, &output)?;
        match predictions.ncols() {
            1 => self.inner.transform_into(predictions, output),
            2 => {
                let (mut negative, mut positive) =
                    output.multi_slice_mut((s![.., 0..1], s![.., 1..2]));
                self.inner
                    .transform_into(predictions.slice(s![.., 1..2]), positive.view_mut())?;
                negative.zip_mut_with(&positive, |n, &p| *n = 1.0 - p);
                Ok(())
            }
            n => Err(ShapeError::BinaryColumns(n)),
        }
    }
}
