//! The configured piecewise-linear transform operator.

use std::sync::Arc;

use ndarray::{Array2, ArrayD, ArrayView1, ArrayView2, ArrayViewD, ArrayViewMut2, Axis, Ix1, Ix2};
use rayon::ThreadPool;
use tracing::debug;

use super::config::TransformConfig;
use super::source::{ParameterInputs, ParameterSource};
use crate::error::{ConfigurationError, ShapeError, TransformError};
use crate::inference::{BatchTransform, BinaryAdapter, Transformer};
use crate::utils::{thread_pool, Parallelism};

/// Piecewise-linear calibration of prediction batches.
///
/// Created once from a [`TransformConfig`] and then called once per batch.
/// Calls are pure: the transform keeps no state between them and can be shared
/// across threads. An explicit `n_threads > 1` gets a dedicated rayon pool,
/// built here once and shared by clones.
///
/// # Inputs
///
/// The call surface ([`run`](Self::run)) takes either one input
/// (`predictions`, with static parameters) or four (`predictions`, `bounds`,
/// `slopes`, `intercepts`). Predictions are `(n_rows, n_columns)` or a 1-D
/// vector treated as a single column; the output has the same shape.
///
/// # Example
///
/// ```
/// use calibrators::model::{PiecewiseLinearTransform, TransformConfig};
/// use ndarray::array;
///
/// let config = TransformConfig::builder()
///     .bounds(vec![0.0, 1.0, 2.0])
///     .slopes(vec![1.0, 2.0])
///     .intercepts(vec![0.0, -1.0])
///     .build()
///     .unwrap();
/// let op = PiecewiseLinearTransform::new(config).unwrap();
///
/// let out = op.transform(array![[-1.0], [0.5], [1.5], [3.0]].view()).unwrap();
/// assert_eq!(out, array![[0.0], [0.5], [2.0], [3.0]]);
/// ```
#[derive(Debug, Clone)]
pub struct PiecewiseLinearTransform {
    config: TransformConfig,
    source: ParameterSource,
    parallelism: Parallelism,
    pool: Option<Arc<ThreadPool>>,
}

impl PiecewiseLinearTransform {
    /// Configure a transform.
    ///
    /// Static parameters are validated immediately, so a transform that was
    /// created successfully can only fail on call-time inputs.
    ///
    /// # Errors
    ///
    /// Any validation error of the configuration or its static parameters, or
    /// [`ConfigurationError::ThreadPool`] if the requested pool can't start.
    pub fn new(config: TransformConfig) -> Result<Self, ConfigurationError> {
        let source = ParameterSource::from_config(&config)?;
        let parallelism = Parallelism::from_n_threads(config.n_threads);
        let pool = thread_pool(config.n_threads)
            .map_err(|err| ConfigurationError::ThreadPool {
                n_threads: config.n_threads.map_or(0, |n| n.get()),
                reason: err.to_string(),
            })?
            .map(Arc::new);

        match &source {
            ParameterSource::Configured(params) => debug!(
                binary = config.binary,
                n_groups = params.n_groups(),
                n_pieces = params.n_pieces(),
                ?parallelism,
                n_threads = config.n_threads.map(|n| n.get()),
                "configured piecewise linear transform with static parameters"
            ),
            ParameterSource::Supplied => debug!(
                binary = config.binary,
                ?parallelism,
                n_threads = config.n_threads.map(|n| n.get()),
                "configured piecewise linear transform with supplied parameters"
            ),
        }

        Ok(Self {
            config,
            source,
            parallelism,
            pool,
        })
    }

    #[inline]
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    #[inline]
    pub fn source(&self) -> &ParameterSource {
        &self.source
    }

    #[inline]
    pub fn is_binary(&self) -> bool {
        self.config.binary
    }

    #[inline]
    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    /// The dedicated pool, if `n_threads` asked for more than one thread.
    #[inline]
    pub fn thread_pool(&self) -> Option<&ThreadPool> {
        self.pool.as_deref()
    }

    /// Transform with static parameters.
    pub fn transform(&self, predictions: ArrayView2<'_, f32>) -> Result<Array2<f32>, TransformError> {
        self.transform_batch(predictions, None)
    }

    /// Transform with parameters supplied for this call.
    pub fn transform_with(
        &self,
        predictions: ArrayView2<'_, f32>,
        bounds: &[f32],
        slopes: &[f32],
        intercepts: &[f32],
    ) -> Result<Array2<f32>, TransformError> {
        self.transform_batch(
            predictions,
            Some(ParameterInputs::new(bounds, slopes, intercepts)),
        )
    }

    /// Transform into a caller-provided output of the same shape.
    ///
    /// `inputs` must be `Some` exactly when parameters weren't configured
    /// statically. Everything is validated before `output` is touched.
    pub fn transform_into(
        &self,
        predictions: ArrayView2<'_, f32>,
        inputs: Option<ParameterInputs<'_>>,
        output: ArrayViewMut2<'_, f32>,
    ) -> Result<(), TransformError> {
        let params = self.source.resolve(inputs, &self.config)?;
        debug!(
            n_rows = predictions.nrows(),
            n_columns = predictions.ncols(),
            n_groups = params.n_groups(),
            binary = self.config.binary,
            "transforming batch"
        );

        let params = &*params;
        let parallelism = self.parallelism;
        let binary = self.config.binary;
        // Group count for binary mode was checked when `params` resolved.
        let evaluate = move || {
            if binary {
                BinaryAdapter::single_group(params)
                    .with_parallelism(parallelism)
                    .transform_into(predictions, output)
            } else {
                Transformer::new(params)
                    .with_parallelism(parallelism)
                    .transform_into(predictions, output)
            }
        };
        match &self.pool {
            Some(pool) => pool.install(evaluate)?,
            None => evaluate()?,
        }
        Ok(())
    }

    /// Run the operator on raw inputs.
    ///
    /// Takes `[predictions]` or `[predictions, bounds, slopes, intercepts]`.
    ///
    /// # Errors
    ///
    /// - [`ShapeError::InputCount`] for any other number of inputs
    /// - [`ShapeError::PredictionRank`] unless predictions are 1-D or 2-D
    /// - [`ShapeError::ParameterRank`] unless parameter inputs are 1-D
    /// - [`ConfigurationError`] if the parameter source or contents are invalid
    /// - [`ShapeError`] if the column count doesn't fit the mode
    pub fn run(&self, inputs: &[ArrayViewD<'_, f32>]) -> Result<ArrayD<f32>, TransformError> {
        let (predictions, params) = match inputs {
            [predictions] => (predictions, None),
            [predictions, bounds, slopes, intercepts] => (
                predictions,
                Some(ParameterInputs {
                    bounds: parameter_input("bounds", bounds)?,
                    slopes: parameter_input("slopes", slopes)?,
                    intercepts: parameter_input("intercepts", intercepts)?,
                }),
            ),
            _ => return Err(ShapeError::InputCount(inputs.len()).into()),
        };

        let batch = prediction_batch(predictions)?;
        let output = self.transform_batch(batch, params)?.into_dyn();

        if predictions.ndim() == 1 {
            Ok(output.index_axis_move(Axis(1), 0))
        } else {
            Ok(output)
        }
    }

    fn transform_batch(
        &self,
        predictions: ArrayView2<'_, f32>,
        inputs: Option<ParameterInputs<'_>>,
    ) -> Result<Array2<f32>, TransformError> {
        let mut output = Array2::zeros(predictions.raw_dim());
        self.transform_into(predictions, inputs, output.view_mut())?;
        Ok(output)
    }
}

/// View predictions as a 2-D batch; 1-D predictions become one column.
fn prediction_batch<'a>(
    predictions: &ArrayViewD<'a, f32>,
) -> Result<ArrayView2<'a, f32>, ShapeError> {
    let rank_error = |_| ShapeError::PredictionRank(predictions.ndim());
    match predictions.ndim() {
        1 => predictions
            .clone()
            .insert_axis(Axis(1))
            .into_dimensionality::<Ix2>()
            .map_err(rank_error),
        2 => predictions.clone().into_dimensionality::<Ix2>().map_err(rank_error),
        ndim => Err(ShapeError::PredictionRank(ndim)),
    }
}

fn parameter_input<'a>(
    name: &'static str,
    input: &ArrayViewD<'a, f32>,
) -> Result<ArrayView1<'a, f32>, ShapeError> {
    let ndim = input.ndim();
    input
        .clone()
        .into_dimensionality::<Ix1>()
        .map_err(|_| ShapeError::ParameterRank { name, ndim })
}
