//! Sign conventions for signed equivalent stresses and strains.
//!
//! A signed equivalent is `sign(q) * unsigned`, where `q` is a reference
//! quantity of the same state. When `q` is numerically zero the sign is +1,
//! never 0 or −1, so near-zero noise cannot flip the result.

use crate::principal;
use crate::types::{mean_normal, Voigt6};
use crate::voigt;

/// Quantity whose sign is carried over to the equivalent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SignReference {
    /// Hydrostatic stress or volumetric strain (mean normal component).
    Hydrostatic,
    /// Average of the maximum and minimum principal values, (v1 + v3)/2.
    ///
    /// Its sign equals the sign of the principal value with the largest
    /// magnitude.
    MaxAbsPrincipal,
    /// First invariant (trace).
    FirstInvariant,
}

impl SignReference {
    /// All supported references.
    pub const ALL: [SignReference; 3] = [
        SignReference::Hydrostatic,
        SignReference::MaxAbsPrincipal,
        SignReference::FirstInvariant,
    ];
}

/// Tolerances for treating the reference quantity as zero.
///
/// A value `x` is zero when `|x − 0| ≤ atol + rtol·|0|`, the same closeness
/// test as `isclose(x, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SignTolerance {
    /// Relative tolerance.
    pub rtol: f64,
    /// Absolute tolerance.
    pub atol: f64,
}

impl Default for SignTolerance {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

impl SignTolerance {
    /// `|a − b| ≤ atol + rtol·|b|`.
    #[inline]
    pub fn is_close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.atol + self.rtol * b.abs()
    }
}

/// Sign of `x` with the near-zero default of +1. NaN stays NaN.
pub fn sign(x: f64, tolerance: SignTolerance) -> f64 {
    if tolerance.is_close(x, 0.0) {
        1.0
    } else {
        x.signum()
    }
}

/// Value of the reference quantity for a Voigt state.
pub fn reference_value(state: &Voigt6, reference: SignReference) -> f64 {
    match reference {
        SignReference::Hydrostatic => mean_normal(state),
        SignReference::FirstInvariant => state[0] + state[1] + state[2],
        SignReference::MaxAbsPrincipal => {
            let p = principal::values_sorted(&voigt::to_matrix(state));
            0.5 * (p[0] + p[2])
        }
    }
}

/// Apply the sign of the reference quantity of `state` to `value`.
pub fn signed(value: f64, state: &Voigt6, reference: SignReference, tolerance: SignTolerance) -> f64 {
    sign(reference_value(state, reference), tolerance) * value
}
