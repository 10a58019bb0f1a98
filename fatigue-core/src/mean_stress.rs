//! Mean-stress corrections and Basquin life prediction.
//!
//! A correction maps a (stress amplitude, mean stress) pair to the fully
//! reversed amplitude σeq that causes the same damage. The life then follows
//! from the Basquin curve.

use crate::error::{Error, Result, Warning};
use crate::sn_curve::Basquin;
use log::{debug, warn};
use ndarray::{ArrayD, ArrayViewD, Zip};

/// Correction kind without constants, resolved against a [`Material`](crate::Material).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CorrectionMethod {
    Goodman,
    Gerber,
    Morrow,
    Swt,
    Asme,
}

/// Mean-stress correction with its material constant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MeanStressCorrection {
    /// σa / (1 − σm/σu)
    Goodman { ult_stress: f64 },
    /// σa / (1 − (σm/σu)²)
    Gerber { ult_stress: f64 },
    /// σa / (1 − σm/σf')
    Morrow { true_fract_stress: f64 },
    /// Smith-Watson-Topper, sqrt(σa·(σm + σa))
    Swt,
    /// σa / sqrt(1 − (σm/Re)²)
    Asme { yield_stress: f64 },
}

impl MeanStressCorrection {
    pub fn method(&self) -> CorrectionMethod {
        match self {
            Self::Goodman { .. } => CorrectionMethod::Goodman,
            Self::Gerber { .. } => CorrectionMethod::Gerber,
            Self::Morrow { .. } => CorrectionMethod::Morrow,
            Self::Swt => CorrectionMethod::Swt,
            Self::Asme { .. } => CorrectionMethod::Asme,
        }
    }

    /// Material constant the mean stress is normalized by, with its name.
    fn parameter(&self) -> Option<(&'static str, f64)> {
        match *self {
            Self::Goodman { ult_stress } | Self::Gerber { ult_stress } => {
                Some(("ultimate tensile strength", ult_stress))
            }
            Self::Morrow { true_fract_stress } => Some(("true fracture stress", true_fract_stress)),
            Self::Asme { yield_stress } => Some(("yield strength", yield_stress)),
            Self::Swt => None,
        }
    }

    /// Equivalent amplitude of a single pair, without validation.
    #[inline]
    pub fn apply(&self, amp: f64, mean: f64) -> f64 {
        match *self {
            Self::Goodman { ult_stress } => amp / (1.0 - mean / ult_stress),
            Self::Gerber { ult_stress } => amp / (1.0 - (mean / ult_stress).powi(2)),
            Self::Morrow { true_fract_stress } => amp / (1.0 - mean / true_fract_stress),
            Self::Swt => (amp * (mean + amp)).sqrt(),
            Self::Asme { yield_stress } => amp / (1.0 - (mean / yield_stress).powi(2)).sqrt(),
        }
    }

    fn validate(&self, stress_amp: &ArrayViewD<'_, f64>, mean_stress: &ArrayViewD<'_, f64>) -> Result<()> {
        if stress_amp.shape() != mean_stress.shape() {
            return Err(Error::Shape(format!(
                "stress amplitude {:?} and mean stress {:?} must have the same shape",
                stress_amp.shape(),
                mean_stress.shape()
            )));
        }
        if let Some(a) = stress_amp.iter().find(|&&a| a < 0.0) {
            return Err(Error::Domain(format!("stress amplitude must be non-negative, got {}", a)));
        }

        match self.parameter() {
            Some((name, value)) => {
                if !(value > 0.0) {
                    return Err(Error::Parameter(format!("{} must be positive, got {}", name, value)));
                }
                if let Some(m) = mean_stress.iter().find(|&&m| (m / value).abs() >= 1.0) {
                    return Err(Error::Domain(format!(
                        "|mean stress| must be below the {} ({}), got {}",
                        name, value, m
                    )));
                }
            }
            None => {
                let violation = Zip::from(stress_amp)
                    .and(mean_stress)
                    .fold(None, |found, &a, &m| found.or((a <= m.abs()).then_some((a, m))));
                if let Some((a, m)) = violation {
                    return Err(Error::Domain(format!(
                        "SWT requires stress amplitude > |mean stress|, got {} and {}",
                        a, m
                    )));
                }
            }
        }
        Ok(())
    }

    /// Equivalent fully reversed amplitude, element-wise.
    ///
    /// # Errors
    ///
    /// - [`Error::Shape`] if the two arrays differ in shape
    /// - [`Error::Parameter`] if the material constant is not positive
    /// - [`Error::Domain`] for a negative amplitude, `|σm|` at or above the
    ///   material constant, or (SWT) an amplitude not above `|σm|`
    pub fn equivalent_amplitude(
        &self,
        stress_amp: ArrayViewD<'_, f64>,
        mean_stress: ArrayViewD<'_, f64>,
    ) -> Result<ArrayD<f64>> {
        self.validate(&stress_amp, &mean_stress)?;
        let correction = *self;
        Ok(Zip::from(&stress_amp)
            .and(&mean_stress)
            .par_map_collect(|&a, &m| correction.apply(a, m)))
    }
}

/// Goodman equivalent amplitude.
pub fn stress_eq_amp_goodman(
    stress_amp: ArrayViewD<'_, f64>,
    mean_stress: ArrayViewD<'_, f64>,
    ult_stress: f64,
) -> Result<ArrayD<f64>> {
    MeanStressCorrection::Goodman { ult_stress }.equivalent_amplitude(stress_amp, mean_stress)
}

/// Gerber equivalent amplitude.
pub fn stress_eq_amp_gerber(
    stress_amp: ArrayViewD<'_, f64>,
    mean_stress: ArrayViewD<'_, f64>,
    ult_stress: f64,
) -> Result<ArrayD<f64>> {
    MeanStressCorrection::Gerber { ult_stress }.equivalent_amplitude(stress_amp, mean_stress)
}

/// Morrow equivalent amplitude.
pub fn stress_eq_amp_morrow(
    stress_amp: ArrayViewD<'_, f64>,
    mean_stress: ArrayViewD<'_, f64>,
    true_fract_stress: f64,
) -> Result<ArrayD<f64>> {
    MeanStressCorrection::Morrow { true_fract_stress }.equivalent_amplitude(stress_amp, mean_stress)
}

/// Smith-Watson-Topper equivalent amplitude.
pub fn stress_eq_amp_swt(
    stress_amp: ArrayViewD<'_, f64>,
    mean_stress: ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>> {
    MeanStressCorrection::Swt.equivalent_amplitude(stress_amp, mean_stress)
}

/// ASME elliptic equivalent amplitude.
pub fn stress_eq_amp_asme(
    stress_amp: ArrayViewD<'_, f64>,
    mean_stress: ArrayViewD<'_, f64>,
    yield_stress: f64,
) -> Result<ArrayD<f64>> {
    MeanStressCorrection::Asme { yield_stress }.equivalent_amplitude(stress_amp, mean_stress)
}

/// Life estimate for a batch of load pairs.
#[derive(Debug, Clone)]
pub struct LifePrediction {
    /// Cycles to failure, whole numbers of at least 1.
    ///
    /// Kept as `f64` so high-cycle lives beyond the integer range survive.
    pub cycles: ArrayD<f64>,
    /// Equivalent fully reversed amplitude.
    pub eq_stress_amp: ArrayD<f64>,
    pub warnings: Vec<Warning>,
}

/// Correct for mean stress and look the life up on a Basquin curve.
///
/// N = ½·(σeq/σf)^(1/b), floored at one cycle and rounded half to even.
/// Loads whose Basquin life is below one cycle (σeq > σf·2^b) are not an
/// error: their count is reported as [`Warning::ExcessiveLoad`] and logged.
///
/// # Errors
///
/// Besides the errors of [`MeanStressCorrection::equivalent_amplitude`],
/// returns [`Error::Domain`] for an amplitude that is not positive or for
/// non-finite input.
pub fn predict_life(
    correction: &MeanStressCorrection,
    basquin: &Basquin,
    stress_amp: ArrayViewD<'_, f64>,
    mean_stress: ArrayViewD<'_, f64>,
) -> Result<LifePrediction> {
    if let Some(a) = stress_amp.iter().find(|&&a| !(a > 0.0 && a.is_finite())) {
        return Err(Error::Domain(format!("stress amplitude must be positive and finite, got {}", a)));
    }
    if let Some(m) = mean_stress.iter().find(|m| !m.is_finite()) {
        return Err(Error::Domain(format!("mean stress must be finite, got {}", m)));
    }

    let eq_stress_amp = correction.equivalent_amplitude(stress_amp, mean_stress)?;

    let raw = eq_stress_amp.mapv(|s| basquin.cycles(s));

    let mut warnings = Vec::new();
    let excessive = raw.iter().filter(|&&n| n < 1.0).count();
    if excessive > 0 {
        let warning = Warning::ExcessiveLoad { count: excessive };
        warn!(
            "{} (fatigue strength coefficient {})",
            warning,
            basquin.fat_strength_coef()
        );
        warnings.push(warning);
    }

    let cycles = raw.mapv(|n| n.max(1.0).round_ties_even());
    debug!(
        "{:?} life prediction for {} load pair(s)",
        correction.method(),
        cycles.len()
    );

    Ok(LifePrediction {
        cycles,
        eq_stress_amp,
        warnings,
    })
}

/// Goodman-corrected Basquin life from raw constants.
pub fn goodman_life(
    stress_amp: ArrayViewD<'_, f64>,
    mean_stress: ArrayViewD<'_, f64>,
    fat_strength_coef: f64,
    fat_strength_exp: f64,
    ult_stress: f64,
) -> Result<LifePrediction> {
    let basquin = Basquin::new(fat_strength_coef, fat_strength_exp)?;
    predict_life(
        &MeanStressCorrection::Goodman { ult_stress },
        &basquin,
        stress_amp,
        mean_stress,
    )
}
