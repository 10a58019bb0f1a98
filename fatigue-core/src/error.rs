//! Error and warning types for fatigue-core operations.

use thiserror::Error;

/// Result type alias using fatigue-core Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during fatigue-core operations.
///
/// All of these abort the call before any partial result is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed array shape (e.g. trailing Voigt axis not of length 6).
    #[error("shape error: {0}")]
    Shape(String),

    /// Invalid material or model constants at construction time.
    #[error("invalid parameter: {0}")]
    Parameter(String),

    /// Argument values outside the domain of the evaluated formula.
    #[error("domain error: {0}")]
    Domain(String),
}

/// Non-fatal numeric conditions.
///
/// These are recovered locally (best-effort estimate, clipping) and reported
/// alongside the result instead of failing the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    /// Newton iteration hit its cap without meeting the tolerance.
    #[error(
        "Newton iteration did not converge after {iterations} iterations \
         (max relative step {max_relative_step:.3e}); results may be approximate"
    )]
    Convergence {
        iterations: usize,
        max_relative_step: f64,
    },

    /// Equivalent amplitude too high for a full cycle on the life curve.
    #[error(
        "predicted life is below one cycle for {count} value(s) (equivalent \
         stress amplitude near or above the fatigue strength coefficient); clipped to 1"
    )]
    ExcessiveLoad { count: usize },
}
