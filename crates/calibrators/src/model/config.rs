//! Transform configuration with builder pattern.
//!
//! [`TransformConfig`] mirrors the operator arguments: the optional static
//! parameters (`bounds`, `slopes`, `intercepts`), the `binary` flag, plus a
//! continuity policy and thread count. It is built with the `bon` crate and can
//! also be deserialized from a JSON argument map.
//!
//! # Example
//!
//! ```
//! use calibrators::model::{ContinuityCheck, TransformConfig};
//!
//! // Parameters come from inputs at call time
//! let config = TransformConfig::builder().build().unwrap();
//!
//! // Static parameters, binary predictions
//! let config = TransformConfig::builder()
//!     .bounds(vec![0.0, 0.5, 1.0])
//!     .slopes(vec![0.5, 1.5])
//!     .intercepts(vec![0.0, -0.5])
//!     .binary(true)
//!     .continuity(ContinuityCheck::Enforce)
//!     .build()
//!     .unwrap();
//! ```

use std::num::NonZeroUsize;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Default relative tolerance for continuity checks.
pub const DEFAULT_CONTINUITY_TOLERANCE: f32 = 1e-5;

/// What to do with parameters whose pieces don't meet at shared bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContinuityCheck {
    /// Don't check. Discontinuous parameters evaluate as given.
    #[default]
    Ignore,
    /// Log each discontinuity and carry on.
    Warn,
    /// Reject discontinuous parameters with a configuration error.
    Enforce,
}

/// Configuration of a [`PiecewiseLinearTransform`](super::PiecewiseLinearTransform).
///
/// The three parameter lists go together: either all are set (parameters are
/// static) or none is (parameters arrive as inputs on every call).
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    // === Static parameters ===
    /// Flat bounds, `n_groups * (n_pieces + 1)` values.
    pub bounds: Option<Vec<f32>>,

    /// Flat slopes, `n_groups * n_pieces` values.
    pub slopes: Option<Vec<f32>>,

    /// Flat intercepts, `n_groups * n_pieces` values.
    pub intercepts: Option<Vec<f32>>,

    // === Mode ===
    /// Treat predictions as Nx1 positive scores or Nx2 `[negative, positive]`
    /// pairs sharing one function group. Default: `false`.
    #[builder(default)]
    pub binary: bool,

    // === Validation ===
    /// Continuity policy. Default: `Ignore`.
    #[builder(default)]
    pub continuity: ContinuityCheck,

    /// Relative tolerance for continuity checks. Default: `1e-5`.
    #[builder(default = DEFAULT_CONTINUITY_TOLERANCE)]
    pub continuity_tolerance: f32,

    // === Resources ===
    /// Number of threads. `None` uses the ambient rayon pool; `1` forces
    /// sequential evaluation; larger counts run on a dedicated pool of that
    /// size, built once per transform.
    pub n_threads: Option<NonZeroUsize>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            bounds: None,
            slopes: None,
            intercepts: None,
            binary: false,
            continuity: ContinuityCheck::Ignore,
            continuity_tolerance: DEFAULT_CONTINUITY_TOLERANCE,
            n_threads: None,
        }
    }
}

/// Custom finishing function that validates the config.
impl<S: transform_config_builder::IsComplete> TransformConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if only some parameter lists are set or
    /// the continuity tolerance is negative or not finite. Parameter contents
    /// are checked when the transform is created.
    pub fn build(self) -> Result<TransformConfig, ConfigurationError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl TransformConfig {
    /// Validate the configuration.
    ///
    /// Called by the builder; call it yourself on deserialized configs.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let present = [
            ("bounds", self.bounds.is_some()),
            ("slopes", self.slopes.is_some()),
            ("intercepts", self.intercepts.is_some()),
        ];
        if present.iter().any(|&(_, set)| set) {
            let missing: Vec<&'static str> = present
                .iter()
                .filter(|&&(_, set)| !set)
                .map(|&(name, _)| name)
                .collect();
            if !missing.is_empty() {
                return Err(ConfigurationError::IncompleteArguments { missing });
            }
        }

        if !self.continuity_tolerance.is_finite() || self.continuity_tolerance < 0.0 {
            return Err(ConfigurationError::InvalidTolerance(self.continuity_tolerance));
        }
        Ok(())
    }

    /// Whether parameters are given as arguments rather than inputs.
    #[inline]
    pub fn has_static_params(&self) -> bool {
        self.bounds.is_some() && self.slopes.is_some() && self.intercepts.is_some()
    }
}
