//! Batch evaluation: one piecewise function per prediction column.

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Zip};

use crate::error::ShapeError;
use crate::repr::{PiecewiseFunction, PiecewiseParams};
use crate::utils::Parallelism;

/// A transform from a prediction batch to a calibrated batch of the same shape.
///
/// Implemented by [`Transformer`] (one function group per column) and
/// [`BinaryAdapter`](super::BinaryAdapter) (one group shared by a pair of
/// complementary columns).
pub trait BatchTransform {
    /// Transform `predictions` into a caller-provided `output` of the same shape.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] if `output` doesn't match `predictions` or if the
    /// column count doesn't fit the configured functions. Nothing is written
    /// in that case.
    fn transform_into(
        &self,
        predictions: ArrayView2<'_, f32>,
        output: ArrayViewMut2<'_, f32>,
    ) -> Result<(), ShapeError>;

    /// Transform `predictions` into a newly allocated array.
    ///
    /// Returns an array with shape `(n_rows, n_columns)`, identical to the input.
    fn transform(&self, predictions: ArrayView2<'_, f32>) -> Result<Array2<f32>, ShapeError> {
        let mut output = Array2::zeros(predictions.raw_dim());
        self.transform_into(predictions, output.view_mut())?;
        Ok(output)
    }
}

/// Evaluates column `j` of a batch with function group `j`.
///
/// # Example
///
/// ```
/// use calibrators::inference::{BatchTransform, Transformer};
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
/// let out = Transformer::new(&params)
///     .transform(array![[-1.0], [1.5], [3.0]].view())
///     .unwrap();
/// assert_eq!(out, array![[0.0], [2.0], [3.0]]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Transformer<'a> {
    params: &'a PiecewiseParams,
    parallelism: Parallelism,
}

impl<'a> Transformer<'a> {
    /// Sequential transformer over `params`.
    pub fn new(params: &'a PiecewiseParams) -> Self {
        Self {
            params,
            parallelism: Parallelism::Sequential,
        }
    }

    /// Set whether rows may be evaluated in parallel.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    #[inline]
    pub fn params(&self) -> &'a PiecewiseParams {
        self.params
    }

    #[inline]
    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }
}

impl BatchTransform for Transformer<'_> {
    fn transform_into(
        &self,
        predictions: ArrayView2<'_, f32>,
        mut output: ArrayViewMut2<'_, f32>,
    ) -> Result<(), ShapeError> {
        check_output_shape(&predictions, &output)?;
        if predictions.ncols() != self.params.n_groups() {
            return Err(ShapeError::ColumnCount {
                expected: self.params.n_groups(),
                actual: predictions.ncols(),
            });
        }

        let functions: Vec<PiecewiseFunction<'_>> = self.params.groups().collect();
        let eval_row = |mut out: ArrayViewMut1<'_, f32>, row: ArrayView1<'_, f32>| {
            for ((o, &x), f) in out.iter_mut().zip(row.iter()).zip(&functions) {
                *o = f.evaluate(x);
            }
        };

        let rows = Zip::from(output.rows_mut()).and(predictions.rows());
        match self.parallelism {
            Parallelism::Sequential => rows.for_each(eval_row),
            Parallelism::Parallel => rows.par_for_each(eval_row),
        }
        Ok(())
    }
}

pub(crate) fn check_output_shape(
    predictions: &ArrayView2<'_, f32>,
    output: &ArrayViewMut2<'_, f32>,
) -> Result<(), ShapeError> {
    if predictions.dim() != output.dim() {
        return Err(ShapeError::OutputShape {
            expected: predictions.dim(),
            actual: output.dim(),
        });
    }
    Ok(())
}
