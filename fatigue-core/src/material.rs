//! Fatigue material constants.
//!
//! A [`Material`] bundles the Basquin constants with the static strengths the
//! mean-stress corrections normalize by, so a correction can be picked by
//! [`CorrectionMethod`] alone.

use crate::error::{Error, Result};
use crate::mean_stress::{predict_life, CorrectionMethod, LifePrediction, MeanStressCorrection};
use crate::sn_curve::Basquin;
use ndarray::ArrayViewD;

/// Raw material constants, as read from data files.
///
/// Converted into a validated [`Material`] with `Material::try_from`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MaterialConstants {
    /// Fatigue strength coefficient σf'.
    pub fat_strength_coef: f64,
    /// Fatigue strength exponent b (negative).
    pub fat_strength_exp: f64,
    /// Ultimate tensile strength σu.
    pub ult_stress: f64,
    /// Yield strength Re, needed by ASME.
    #[cfg_attr(feature = "serde", serde(default))]
    pub yield_stress: Option<f64>,
    /// True fracture stress σf, needed by Morrow.
    #[cfg_attr(feature = "serde", serde(default))]
    pub true_fract_stress: Option<f64>,
}

/// Validated material constants for stress-life analysis (stresses in MPa).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(try_from = "MaterialConstants", into = "MaterialConstants")
)]
pub struct Material {
    fat_strength_coef: f64,
    fat_strength_exp: f64,
    ult_stress: f64,
    yield_stress: Option<f64>,
    true_fract_stress: Option<f64>,
}

impl TryFrom<MaterialConstants> for Material {
    type Error = Error;

    fn try_from(constants: MaterialConstants) -> Result<Self> {
        let mut material = Material::new(
            constants.fat_strength_coef,
            constants.fat_strength_exp,
            constants.ult_stress,
        )?;
        if let Some(yield_stress) = constants.yield_stress {
            material = material.with_yield_stress(yield_stress)?;
        }
        if let Some(true_fract_stress) = constants.true_fract_stress {
            material = material.with_true_fract_stress(true_fract_stress)?;
        }
        Ok(material)
    }
}

impl From<Material> for MaterialConstants {
    fn from(material: Material) -> Self {
        Self {
            fat_strength_coef: material.fat_strength_coef,
            fat_strength_exp: material.fat_strength_exp,
            ult_stress: material.ult_stress,
            yield_stress: material.yield_stress,
            true_fract_stress: material.true_fract_stress,
        }
    }
}

impl Material {
    /// Create a material from its Basquin constants and ultimate strength.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parameter`] unless σf' > 0, b < 0 and σu > 0.
    pub fn new(fat_strength_coef: f64, fat_strength_exp: f64, ult_stress: f64) -> Result<Self> {
        Basquin::new(fat_strength_coef, fat_strength_exp)?;
        if !(ult_stress > 0.0) {
            return Err(Error::Parameter(
                "Ultimate tensile strength must be positive".into(),
            ));
        }
        Ok(Self {
            fat_strength_coef,
            fat_strength_exp,
            ult_stress,
            yield_stress: None,
            true_fract_stress: None,
        })
    }

    /// Set the yield strength.
    pub fn with_yield_stress(mut self, yield_stress: f64) -> Result<Self> {
        if !(yield_stress > 0.0) {
            return Err(Error::Parameter("Yield strength must be positive".into()));
        }
        self.yield_stress = Some(yield_stress);
        Ok(self)
    }

    /// Set the true fracture stress.
    pub fn with_true_fract_stress(mut self, true_fract_stress: f64) -> Result<Self> {
        if !(true_fract_stress > 0.0) {
            return Err(Error::Parameter("True fracture stress must be positive".into()));
        }
        self.true_fract_stress = Some(true_fract_stress);
        Ok(self)
    }

    /// Fatigue strength coefficient σf'.
    pub fn fat_strength_coef(&self) -> f64 {
        self.fat_strength_coef
    }

    /// Fatigue strength exponent b.
    pub fn fat_strength_exp(&self) -> f64 {
        self.fat_strength_exp
    }

    /// Ultimate tensile strength σu.
    pub fn ult_stress(&self) -> f64 {
        self.ult_stress
    }

    /// Yield strength Re, if set.
    pub fn yield_stress(&self) -> Option<f64> {
        self.yield_stress
    }

    /// True fracture stress σf, if set.
    pub fn true_fract_stress(&self) -> Option<f64> {
        self.true_fract_stress
    }

    /// Basquin curve of this material.
    pub fn basquin(&self) -> Result<Basquin> {
        Basquin::new(self.fat_strength_coef, self.fat_strength_exp)
    }

    /// Correction of the given kind with this material's constant filled in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parameter`] if the constant the method needs is not set.
    pub fn correction(&self, method: CorrectionMethod) -> Result<MeanStressCorrection> {
        Ok(match method {
            CorrectionMethod::Goodman => MeanStressCorrection::Goodman {
                ult_stress: self.ult_stress,
            },
            CorrectionMethod::Gerber => MeanStressCorrection::Gerber {
                ult_stress: self.ult_stress,
            },
            CorrectionMethod::Morrow => MeanStressCorrection::Morrow {
                true_fract_stress: self.true_fract_stress.ok_or_else(|| {
                    Error::Parameter("Morrow correction needs the true fracture stress".into())
                })?,
            },
            CorrectionMethod::Swt => MeanStressCorrection::Swt,
            CorrectionMethod::Asme => MeanStressCorrection::Asme {
                yield_stress: self.yield_stress.ok_or_else(|| {
                    Error::Parameter("ASME correction needs the yield strength".into())
                })?,
            },
        })
    }

    /// Mean-stress corrected life on this material's Basquin curve.
    pub fn predict_life(
        &self,
        method: CorrectionMethod,
        stress_amp: ArrayViewD<'_, f64>,
        mean_stress: ArrayViewD<'_, f64>,
    ) -> Result<LifePrediction> {
        let correction = self.correction(method)?;
        predict_life(&correction, &self.basquin()?, stress_amp, mean_stress)
    }
}
