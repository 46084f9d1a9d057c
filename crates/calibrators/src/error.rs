//! Error types for parameter validation and batch evaluation.
//!
//! Errors fall into two families:
//!
//! - [`ConfigurationError`]: the piecewise parameters or their source are
//!   unusable (ambiguous source, inconsistent lengths, unsorted bounds, ...).
//! - [`ShapeError`]: the inputs handed to a call don't fit the configured
//!   transform (wrong input count, wrong column count for the mode, ...).
//!
//! Both are raised before any element is evaluated, so a failed call never
//! leaves a partially written output behind. [`TransformError`] wraps either
//! one for the operator-level entry points.

/// Invalid piecewise parameters or parameter source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// Parameters were given both as configuration arguments and as inputs.
    #[error("parameters supplied both as arguments and as inputs; use exactly one source")]
    AmbiguousSource,

    /// Parameters were given neither as arguments nor as inputs.
    #[error("no parameters supplied: pass bounds, slopes and intercepts as arguments or inputs")]
    MissingSource,

    /// Only some of the three parameter arguments were set.
    #[error("incomplete parameter arguments, missing: {}", missing.join(", "))]
    IncompleteArguments { missing: Vec<&'static str> },

    /// `len(bounds) - len(slopes)` must be the (positive) number of groups.
    #[error("bounds ({bounds}) must be longer than slopes ({slopes}) by the number of groups")]
    NoGroups { bounds: usize, slopes: usize },

    /// Lengths don't describe `n_groups` groups with a common piece count.
    #[error(
        "inconsistent parameter lengths: bounds={bounds}, slopes={slopes}, intercepts={intercepts}"
    )]
    LengthMismatch {
        bounds: usize,
        slopes: usize,
        intercepts: usize,
    },

    /// Every group needs at least one piece.
    #[error("piecewise functions need at least one piece")]
    NoPieces,

    /// `bounds[index] > bounds[index + 1]` (or a bound is NaN) in some group.
    #[error("bounds of group {group} are not non-decreasing at index {index}: {low} > {high}")]
    NonMonotonicBounds {
        group: usize,
        index: usize,
        low: f32,
        high: f32,
    },

    /// The number of groups doesn't match what the mode requires.
    #[error("expected {expected} piecewise function group(s), got {actual}")]
    GroupCount { expected: usize, actual: usize },

    /// Adjacent pieces disagree at a shared boundary.
    #[error(
        "group {group} is discontinuous at bound {boundary} (x = {x}): {left} vs {right}"
    )]
    Discontinuous {
        group: usize,
        boundary: usize,
        x: f32,
        left: f32,
        right: f32,
    },

    /// Continuity tolerance must be finite and non-negative.
    #[error("continuity tolerance must be finite and >= 0, got {0}")]
    InvalidTolerance(f32),

    /// The dedicated pool for `n_threads` couldn't be started.
    #[error("failed to build a thread pool with {n_threads} threads: {reason}")]
    ThreadPool { n_threads: usize, reason: String },
}

/// Inputs whose shape or count doesn't fit the configured transform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// The call takes exactly 1 or exactly 4 inputs.
    #[error("expected 1 or 4 inputs, got {0}")]
    InputCount(usize),

    /// Predictions must be 1-D or 2-D.
    #[error("predictions must be 1-D or 2-D, got {0} dimensions")]
    PredictionRank(usize),

    /// Auxiliary parameter inputs must be 1-D.
    #[error("{name} input must be 1-D, got {ndim} dimensions")]
    ParameterRank { name: &'static str, ndim: usize },

    /// Binary mode accepts Nx1 or Nx2 predictions only.
    #[error("binary mode expects 1 or 2 prediction columns, got {0}")]
    BinaryColumns(usize),

    /// One group per column is required outside binary mode.
    #[error("predictions have {actual} columns but {expected} function groups are configured")]
    ColumnCount { expected: usize, actual: usize },

    /// Caller-provided output buffer has the wrong shape.
    #[error("output shape {actual:?} doesn't match predictions shape {expected:?}")]
    OutputShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

/// Any error returned by an operator call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}
