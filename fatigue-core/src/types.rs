//! Core data types for stress and strain states.
//!
//! This module defines the per-state value types used by the batched engines:
//! - Voigt vectors and 3x3 tensors (nalgebra fixed-size aliases)
//! - Stress and strain states with their invariants and equivalents
//!
//! Voigt components are ordered `(11, 22, 33, 23, 13, 12)`, i.e.
//! `[σ_xx, σ_yy, σ_zz, σ_yz, σ_xz, σ_xy]`. Strain shear components are tensor
//! shears (ε_ij), not engineering shears (γ_ij = 2ε_ij).

use crate::principal;
use crate::sign::{self, SignReference, SignTolerance};
use crate::voigt;
use nalgebra::{Matrix3, Vector3, Vector6};

/// Six Voigt components of a symmetric tensor.
pub type Voigt6 = Vector6<f64>;

/// Full symmetric 3x3 tensor.
pub type Tensor3 = Matrix3<f64>;

/// Three principal values, descending.
pub type Principal3 = Vector3<f64>;

/// Invariants `(I1, I2, I3)` of a 3x3 tensor.
///
/// I1 = tr(T), I2 = ½(I1² − tr(T²)), I3 = det(T).
pub fn invariants(t: &Tensor3) -> Vector3<f64> {
    let i1 = t.trace();
    let i2 = 0.5 * (i1 * i1 - (t * t).trace());
    let i3 = t.determinant();
    Vector3::new(i1, i2, i3)
}

/// Mean of the three normal components.
#[inline]
pub fn mean_normal(v: &Voigt6) -> f64 {
    (v[0] + v[1] + v[2]) / 3.0
}

/// Sum of squared normal differences plus six times the squared shears.
///
/// Common kernel of the stress and strain von Mises forms.
#[inline]
fn distortion_sum(v: &Voigt6) -> f64 {
    let (s11, s22, s33) = (v[0], v[1], v[2]);
    let (s23, s13, s12) = (v[3], v[4], v[5]);
    (s11 - s22).powi(2)
        + (s22 - s33).powi(2)
        + (s33 - s11).powi(2)
        + 6.0 * (s12.powi(2) + s23.powi(2) + s13.powi(2))
}

/// Remove `mean` from the normal components, keep shears.
#[inline]
fn remove_mean(v: &Voigt6, mean: f64) -> Voigt6 {
    Voigt6::new(v[0] - mean, v[1] - mean, v[2] - mean, v[3], v[4], v[5])
}

/// Symmetric stress state in Voigt notation.
///
/// Components are ordered as: [σ_11, σ_22, σ_33, σ_23, σ_13, σ_12]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressTensor(pub Voigt6);

impl StressTensor {
    /// Create a new stress state from Voigt components.
    pub fn new(components: [f64; 6]) -> Self {
        Self(Voigt6::from_row_slice(&components))
    }

    /// Zero stress state.
    pub fn zero() -> Self {
        Self(Voigt6::zeros())
    }

    /// Build from a full symmetric matrix (upper triangle is read).
    pub fn from_matrix(t: &Tensor3) -> Self {
        Self(voigt::from_matrix(t))
    }

    /// Extract the full 3x3 symmetric stress matrix.
    pub fn to_matrix(&self) -> Tensor3 {
        voigt::to_matrix(&self.0)
    }

    /// Hydrostatic (mean normal) stress.
    pub fn hydrostatic(&self) -> f64 {
        mean_normal(&self.0)
    }

    /// Deviatoric part, s = σ − σ_h·I.
    pub fn deviator(&self) -> Self {
        Self(remove_mean(&self.0, self.hydrostatic()))
    }

    /// Stress invariants (I1, I2, I3).
    pub fn invariants(&self) -> Vector3<f64> {
        invariants(&self.to_matrix())
    }

    /// Principal stresses, σ1 ≥ σ2 ≥ σ3.
    pub fn principal(&self) -> Principal3 {
        principal::values_sorted(&self.to_matrix())
    }

    /// Principal stresses and directions (column i belongs to σi).
    pub fn principal_with_directions(&self) -> (Principal3, Tensor3) {
        principal::eigen_sorted(&self.to_matrix())
    }

    /// Von Mises equivalent stress.
    pub fn von_mises(&self) -> f64 {
        (0.5 * distortion_sum(&self.0)).sqrt()
    }

    /// Tresca (maximum shear) stress, (σ1 − σ3)/2.
    pub fn tresca(&self) -> f64 {
        let p = self.principal();
        0.5 * (p[0] - p[2])
    }

    /// Von Mises stress signed by the chosen reference quantity.
    pub fn signed_von_mises(&self, reference: SignReference, tolerance: SignTolerance) -> f64 {
        sign::signed(self.von_mises(), &self.0, reference, tolerance)
    }

    /// Tresca stress signed by the chosen reference quantity.
    pub fn signed_tresca(&self, reference: SignReference, tolerance: SignTolerance) -> f64 {
        sign::signed(self.tresca(), &self.0, reference, tolerance)
    }
}

/// Symmetric strain state in Voigt notation.
///
/// Components are ordered as: [ε_11, ε_22, ε_33, ε_23, ε_13, ε_12]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainTensor(pub Voigt6);

impl StrainTensor {
    /// Create a new strain state from Voigt components.
    pub fn new(components: [f64; 6]) -> Self {
        Self(Voigt6::from_row_slice(&components))
    }

    /// Zero strain state.
    pub fn zero() -> Self {
        Self(Voigt6::zeros())
    }

    /// Build from a full symmetric matrix (upper triangle is read).
    pub fn from_matrix(t: &Tensor3) -> Self {
        Self(voigt::from_matrix(t))
    }

    /// Extract the full 3x3 symmetric strain matrix.
    pub fn to_matrix(&self) -> Tensor3 {
        voigt::to_matrix(&self.0)
    }

    /// Volumetric (mean normal) strain.
    pub fn volumetric(&self) -> f64 {
        mean_normal(&self.0)
    }

    /// Deviatoric part, e = ε − ε_vol·I.
    pub fn deviator(&self) -> Self {
        Self(remove_mean(&self.0, self.volumetric()))
    }

    /// Strain invariants (I1, I2, I3).
    pub fn invariants(&self) -> Vector3<f64> {
        invariants(&self.to_matrix())
    }

    /// Principal strains, ε1 ≥ ε2 ≥ ε3.
    pub fn principal(&self) -> Principal3 {
        principal::values_sorted(&self.to_matrix())
    }

    /// Principal strains and directions (column i belongs to εi).
    pub fn principal_with_directions(&self) -> (Principal3, Tensor3) {
        principal::eigen_sorted(&self.to_matrix())
    }

    /// Von Mises equivalent strain.
    ///
    /// Uses the 2/9 factor of the strain form; it is not the stress formula
    /// applied to strains.
    pub fn von_mises(&self) -> f64 {
        (2.0 / 9.0 * distortion_sum(&self.0)).sqrt()
    }

    /// Von Mises equivalent strain from the deviator, sqrt(2/3 · e:e).
    pub fn von_mises_from_deviator(&self) -> f64 {
        let e = self.deviator().to_matrix();
        (2.0 / 3.0 * e.component_mul(&e).sum()).sqrt()
    }

    /// Von Mises strain signed by the chosen reference quantity.
    pub fn signed_von_mises(&self, reference: SignReference, tolerance: SignTolerance) -> f64 {
        sign::signed(self.von_mises(), &self.0, reference, tolerance)
    }
}

impl From<[f64; 6]> for StressTensor {
    fn from(components: [f64; 6]) -> Self {
        Self::new(components)
    }
}

impl From<[f64; 6]> for StrainTensor {
    fn from(components: [f64; 6]) -> Self {
        Self::new(components)
    }
}
