//! fatigue-core - Stress/strain invariants and stress-life fatigue models
//!
//! Batched tensor analysis and life estimation with:
//! - Voigt ↔ tensor conversion for arrays of any leading shape
//! - Principal values and directions (parallel symmetric eigen solves)
//! - Invariants, von Mises and Tresca equivalents with signed variants
//! - S-N curves (Wöhler power law, Kohout-Věchet, Basquin)
//! - Mean-stress corrections (Goodman, Gerber, Morrow, SWT, ASME)
//!
//! # Architecture
//!
//! The library is organized around these abstractions:
//!
//! - [`StressTensor`] / [`StrainTensor`]: single states in Voigt notation
//! - [`stress`] / [`strain`]: the same quantities over `(..., 6)` batches
//! - [`SnCurve`] trait: stress amplitude ↔ cycles to failure
//! - [`MeanStressCorrection`]: equivalent fully reversed amplitude
//! - [`Material`]: constant sets feeding the corrections and Basquin curve
//!
//! Invalid input is reported as [`Error`]; recoverable numeric conditions are
//! returned as [`Warning`] values and logged through the `log` facade.

pub mod types;
pub mod voigt;
pub mod principal;
pub mod sign;
pub mod stress;
pub mod strain;
pub mod sn_curve;
pub mod mean_stress;
pub mod material;
pub mod error;

pub use types::{Principal3, StrainTensor, StressTensor, Tensor3, Voigt6};
pub use voigt::{tensor_to_voigt, voigt_to_tensor};
pub use principal::{principal_values, principal_values_and_directions};
pub use sign::{SignReference, SignTolerance};
pub use sn_curve::{
    Basquin, KohoutVechet, NewtonConfig, NewtonSolution, NewtonStats, SnCurve, WohlerPowerLaw,
};
pub use mean_stress::{predict_life, CorrectionMethod, LifePrediction, MeanStressCorrection};
pub use material::{Material, MaterialConstants};
pub use error::{Error, Result, Warning};
