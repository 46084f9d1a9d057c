//! Where piecewise parameters come from.
//!
//! Parameters are either fixed when the transform is configured
//! ([`ParameterSource::Configured`]) or passed alongside every batch
//! ([`ParameterSource::Supplied`]). The choice is made once from the
//! [`TransformConfig`]; each call then only has to check that it brings
//! parameter inputs exactly when the source expects them.

use std::borrow::Cow;

use ndarray::ArrayView1;
use tracing::warn;

use super::config::{ContinuityCheck, TransformConfig};
use crate::error::ConfigurationError;
use crate::repr::PiecewiseParams;

/// Parameter source, resolved once per configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSource {
    /// Static parameters from configuration arguments, validated up front.
    Configured(PiecewiseParams),
    /// Parameters arrive as `bounds`, `slopes`, `intercepts` inputs on every call.
    Supplied,
}

/// The three auxiliary parameter inputs of one call.
#[derive(Debug, Clone, Copy)]
pub struct ParameterInputs<'a> {
    /// Flat group-major bounds, `n_pieces + 1` per group.
    pub bounds: ArrayView1<'a, f32>,
    /// Flat group-major slopes, `n_pieces` per group.
    pub slopes: ArrayView1<'a, f32>,
    /// Flat group-major intercepts, same layout as `slopes`.
    pub intercepts: ArrayView1<'a, f32>,
}

impl<'a> ParameterInputs<'a> {
    /// View three flat slices as parameter inputs.
    ///
    /// Nothing is validated until [`to_params`](Self::to_params).
    pub fn new(bounds: &'a [f32], slopes: &'a [f32], intercepts: &'a [f32]) -> Self {
        Self {
            bounds: ArrayView1::from(bounds),
            slopes: ArrayView1::from(slopes),
            intercepts: ArrayView1::from(intercepts),
        }
    }

    /// Copy the inputs into a validated collection.
    pub fn to_params(&self) -> Result<PiecewiseParams, ConfigurationError> {
        PiecewiseParams::new(
            self.bounds.to_vec(),
            self.slopes.to_vec(),
            self.intercepts.to_vec(),
        )
    }
}

impl ParameterSource {
    /// Pick the source described by `config`.
    ///
    /// Static parameters are validated here, including the mode and continuity
    /// checks of [`check_params`].
    pub fn from_config(config: &TransformConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        match (&config.bounds, &config.slopes, &config.intercepts) {
            (Some(bounds), Some(slopes), Some(intercepts)) => {
                let params =
                    PiecewiseParams::new(bounds.clone(), slopes.clone(), intercepts.clone())?;
                check_params(&params, config)?;
                Ok(ParameterSource::Configured(params))
            }
            _ => Ok(ParameterSource::Supplied),
        }
    }

    /// Whether parameters were fixed at configuration time.
    #[inline]
    pub fn is_configured(&self) -> bool {
        matches!(self, ParameterSource::Configured(_))
    }

    /// Parameters for one call.
    ///
    /// Configured parameters are borrowed; supplied ones are built from
    /// `inputs` and checked against `config`.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::AmbiguousSource`] if parameters are configured
    ///   and inputs are given as well
    /// - [`ConfigurationError::MissingSource`] if neither is available
    /// - any validation error of the supplied parameters
    pub fn resolve<'s>(
        &'s self,
        inputs: Option<ParameterInputs<'_>>,
        config: &TransformConfig,
    ) -> Result<Cow<'s, PiecewiseParams>, ConfigurationError> {
        match (self, inputs) {
            (ParameterSource::Configured(_), Some(_)) => Err(ConfigurationError::AmbiguousSource),
            (ParameterSource::Configured(params), None) => Ok(Cow::Borrowed(params)),
            (ParameterSource::Supplied, Some(inputs)) => {
                let params = inputs.to_params()?;
                check_params(&params, config)?;
                Ok(Cow::Owned(params))
            }
            (ParameterSource::Supplied, None) => Err(ConfigurationError::MissingSource),
        }
    }
}

/// Mode and continuity checks shared by static and supplied parameters.
pub fn check_params(
    params: &PiecewiseParams,
    config: &TransformConfig,
) -> Result<(), ConfigurationError> {
    if config.binary && params.n_groups() != 1 {
        return Err(ConfigurationError::GroupCount {
            expected: 1,
            actual: params.n_groups(),
        });
    }

    match config.continuity {
        ContinuityCheck::Ignore => {}
        ContinuityCheck::Warn => {
            for d in params.discontinuities(config.continuity_tolerance) {
                warn!(
                    group = d.group,
                    boundary = d.boundary,
                    x = d.x,
                    left = d.left,
                    right = d.right,
                    "piecewise function is discontinuous"
                );
            }
        }
        ContinuityCheck::Enforce => params.check_continuity(config.continuity_tolerance)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use super::*;

    fn static_config() -> TransformConfig {
        TransformConfig::builder()
            .bounds(vec![0.0, 1.0, 2.0])
            .slopes(vec![1.0, 2.0])
            .intercepts(vec![0.0, -1.0])
            .build()
            .unwrap()
    }

    #[test]
    fn static_arguments_make_configured_source() {
        let source = ParameterSource::from_config(&static_config()).unwrap();
        assert!(source.is_configured());
    }

    #[test]
    fn no_arguments_make_supplied_source() {
        let config = TransformConfig::default();
        let source = ParameterSource::from_config(&config).unwrap();
        assert_eq!(source, ParameterSource::Supplied);
    }

    #[test]
    fn configured_borrows_without_inputs() {
        let config = static_config();
        let source = ParameterSource::from_config(&config).unwrap();
        let params = source.resolve(None, &config).unwrap();
        assert!(matches!(params, Cow::Borrowed(_)));
        assert_eq!(params.n_pieces(), 2);
    }

    #[test]
    fn both_sources_are_ambiguous() {
        let config = static_config();
        let source = ParameterSource::from_config(&config).unwrap();
        let inputs = ParameterInputs::new(&[0.0, 1.0], &[1.0], &[0.0]);
        let err = source.resolve(Some(inputs), &config).unwrap_err();
        assert_eq!(err, ConfigurationError::AmbiguousSource);
    }

    #[test]
    fn neither_source_is_missing() {
        let config = TransformConfig::default();
        let err = ParameterSource::Supplied.resolve(None, &config).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingSource);
    }

    #[test]
    fn supplied_inputs_are_validated() {
        let config = TransformConfig::default();
        let inputs = ParameterInputs::new(&[1.0, 0.0], &[1.0], &[0.0]);
        let err = ParameterSource::Supplied
            .resolve(Some(inputs), &config)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::NonMonotonicBounds { .. }));
    }

    #[test]
    fn binary_mode_needs_one_group() {
        let config = TransformConfig::builder()
            .bounds(vec![0.0, 1.0, 0.0, 1.0])
            .slopes(vec![1.0, 1.0])
            .intercepts(vec![0.0, 0.0])
            .binary(true)
            .build()
            .unwrap();
        let err = ParameterSource::from_config(&config).unwrap_err();
        assert_eq!(err, ConfigurationError::GroupCount { expected: 1, actual: 2 });
    }

    #[test]
    fn continuity_policies() {
        let jump = |continuity: ContinuityCheck| {
            TransformConfig::builder()
                .bounds(vec![0.0, 1.0, 2.0])
                .slopes(vec![1.0, 1.0])
                .intercepts(vec![0.0, 2.0])
                .continuity(continuity)
                .build()
                .unwrap()
        };
        assert!(ParameterSource::from_config(&jump(ContinuityCheck::Ignore)).is_ok());
        assert!(ParameterSource::from_config(&jump(ContinuityCheck::Warn)).is_ok());
        assert!(matches!(
            ParameterSource::from_config(&jump(ContinuityCheck::Enforce)),
            Err(ConfigurationError::Discontinuous { group: 0, boundary: 1, .. })
        ));
    }

    /// Captures formatted log output for one closure.
    fn captured_logs(f: impl FnOnce()) -> String {
        #[derive(Clone, Default)]
        struct Buffer(Arc<Mutex<Vec<u8>>>);

        impl Write for Buffer {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn warn_policy_logs_each_discontinuity() {
        // Group 0 jumps at its first internal bound, group 1 at its second.
        let config = |continuity: ContinuityCheck| {
            TransformConfig::builder()
                .bounds(vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0])
                .slopes(vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0])
                .intercepts(vec![0.0, 2.0, 2.0, 0.0, 0.0, 5.0])
                .continuity(continuity)
                .build()
                .unwrap()
        };

        let logs = captured_logs(|| {
            assert!(ParameterSource::from_config(&config(ContinuityCheck::Warn)).is_ok());
        });
        let warnings: Vec<&str> = logs
            .lines()
            .filter(|line| line.contains("piecewise function is discontinuous"))
            .collect();
        assert_eq!(warnings.len(), 2, "{logs}");
        assert!(warnings.iter().all(|line| line.contains("WARN")));
        assert!(warnings[0].contains("group=0 boundary=1"), "{logs}");
        assert!(warnings[1].contains("group=1 boundary=2"), "{logs}");

        let logs = captured_logs(|| {
            assert!(ParameterSource::from_config(&config(ContinuityCheck::Ignore)).is_ok());
        });
        assert!(!logs.contains("discontinuous"), "{logs}");
    }
}
