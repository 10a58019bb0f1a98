//! Strain invariants and equivalent strains over Voigt batches.
//!
//! Strain batches use the same `(..., 6)` layout and component order as stress
//! batches, with tensor (not engineering) shear components. The von Mises
//! strain uses the 2/9 factor:
//!
//! ε_vM = sqrt(2/9·[(ε11−ε22)² + (ε22−ε33)² + (ε33−ε11)² + 6(ε12² + ε23² + ε13²)])

use crate::error::Result;
use crate::principal;
use crate::sign::{SignReference, SignTolerance};
use crate::types::StrainTensor;
use crate::voigt::{collect_states, map_states, to_matrix};
use ndarray::{ArrayBase, ArrayD, Data, Dimension};

/// Principal strains, shape `(..., 3)`, descending.
pub fn principal_strains<S, D>(strain: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(strain, &[3], |v| {
        let p = StrainTensor(*v).principal();
        [p[0], p[1], p[2]]
    })
}

/// Principal strains `(..., 3)` and directions `(..., 3, 3)`.
pub fn principal_strains_and_directions<S, D>(
    strain: &ArrayBase<S, D>,
) -> Result<(ArrayD<f64>, ArrayD<f64>)>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let (leading, states) = collect_states(strain)?;
    let tensors: Vec<_> = states.iter().map(to_matrix).collect();
    principal::decompose(&leading, &tensors)
}

/// Principal strain directions, shape `(..., 3, 3)`.
pub fn principal_strain_directions<S, D>(strain: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    principal_strains_and_directions(strain).map(|(_, directions)| directions)
}

/// Strain invariants `(I1, I2, I3)`, shape `(..., 3)`.
pub fn strain_invariants<S, D>(strain: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(strain, &[3], |v| {
        let inv = StrainTensor(*v).invariants();
        [inv[0], inv[1], inv[2]]
    })
}

/// Volumetric (mean normal) strain, shape `(...)`.
pub fn volumetric_strain<S, D>(strain: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(strain, &[], |v| [StrainTensor(*v).volumetric()])
}

/// Deviatoric strain in Voigt form, shape `(..., 6)`.
pub fn strain_deviator<S, D>(strain: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(strain, &[6], |v| {
        let d = StrainTensor(*v).deviator().0;
        [d[0], d[1], d[2], d[3], d[4], d[5]]
    })
}

/// Von Mises equivalent strain from Voigt components, shape `(...)`.
pub fn von_mises_strain<S, D>(strain: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(strain, &[], |v| [StrainTensor(*v).von_mises()])
}

/// Von Mises equivalent strain from the deviator, sqrt(2/3 · e:e).
pub fn von_mises_strain_from_principals<S, D>(strain: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(strain, &[], |v| [StrainTensor(*v).von_mises_from_deviator()])
}

/// Von Mises strain signed by `reference`, shape `(...)`.
pub fn signed_von_mises_strain<S, D>(
    strain: &ArrayBase<S, D>,
    reference: SignReference,
    tolerance: SignTolerance,
) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(strain, &[], |v| [StrainTensor(*v).signed_von_mises(reference, tolerance)])
}

/// Von Mises strain signed by the volumetric strain.
pub fn signed_von_mises_by_volumetric<S, D>(strain: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    signed_von_mises_strain(strain, SignReference::Hydrostatic, SignTolerance::default())
}

/// Von Mises strain signed by (ε1 + ε3)/2.
pub fn signed_von_mises_by_max_abs_principal<S, D>(strain: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    signed_von_mises_strain(strain, SignReference::MaxAbsPrincipal, SignTolerance::default())
}

/// Von Mises strain signed by the first invariant.
pub fn signed_von_mises_by_first_invariant<S, D>(strain: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    signed_von_mises_strain(strain, SignReference::FirstInvariant, SignTolerance::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::voigt::{tensor_to_voigt, voigt_to_tensor};
    use approx::assert_abs_diff_eq;
    use nalgebra::Matrix3;
    use ndarray::{arr3, Array, Array3, Axis};

    /// Two sets of three strain states, shape (2, 3, 6).
    fn sample_strains() -> Array3<f64> {
        arr3(&[
            [
                [0.01, 0.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, -0.005, 0.0, 0.0, 0.0],
                [0.02, 0.02, 0.02, 0.0, 0.0, 0.0],
            ],
            [
                [0.0, 0.0, 0.0, 0.0, 0.0, 0.03],
                [0.008, 0.008, 0.0, 0.0, 0.0, 0.006],
                [0.014, 0.0, 0.006, 0.0, 0.003, 0.0],
            ],
        ])
    }

    fn as_matrix(row: ndarray::ArrayView1<f64>) -> Matrix3<f64> {
        Matrix3::new(
            row[0], row[5], row[4],
            row[5], row[1], row[3],
            row[4], row[3], row[2],
        )
    }

    #[test]
    fn test_principal_strains() {
        let principals = principal_strains(&sample_strains()).unwrap();
        let expected = arr3(&[
            [[0.01, 0.0, 0.0], [0.0, 0.0, -0.005], [0.02, 0.02, 0.02]],
            [[0.03, 0.0, -0.03], [0.014, 0.002, 0.0], [0.015, 0.005, 0.0]],
        ]);
        assert_eq!(principals.shape(), &[2, 3, 3]);
        for (got, want) in principals.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_principal_strains_and_directions_ordering() {
        let (principals, directions) = principal_strains_and_directions(&sample_strains()).unwrap();
        assert_eq!(principals.shape(), &[2, 3, 3]);
        assert_eq!(directions.shape(), &[2, 3, 3, 3]);

        for p in principals.lanes(Axis(2)) {
            assert!(p[0] >= p[1] && p[1] >= p[2]);
        }
        let only_directions = principal_strain_directions(&sample_strains()).unwrap();
        assert_eq!(only_directions, directions);
    }

    #[test]
    fn test_strain_invariants() {
        let strains = sample_strains();
        let invariants = strain_invariants(&strains).unwrap();
        assert_eq!(invariants.shape(), &[2, 3, 3]);

        for a in 0..2 {
            for b in 0..3 {
                let m = as_matrix(strains.slice(ndarray::s![a, b, ..]));
                let i1 = m.trace();
                let i2 = 0.5 * (i1 * i1 - (m * m).trace());
                assert_abs_diff_eq!(invariants[[a, b, 0]], i1, epsilon = 1e-12);
                assert_abs_diff_eq!(invariants[[a, b, 1]], i2, epsilon = 1e-12);
                assert_abs_diff_eq!(invariants[[a, b, 2]], m.determinant(), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_volumetric_strain() {
        let volumetric = volumetric_strain(&sample_strains()).unwrap();
        let expected = [0.01 / 3.0, -0.005 / 3.0, 0.02, 0.0, 0.016 / 3.0, 0.02 / 3.0];
        assert_eq!(volumetric.shape(), &[2, 3]);
        for (got, want) in volumetric.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_strain_deviator_matches_tensor_form() {
        let strains = sample_strains();
        let deviator = strain_deviator(&strains).unwrap();
        assert_eq!(deviator.shape(), strains.shape());

        let tensors = voigt_to_tensor(&strains).unwrap();
        let mut reference = tensors.clone();
        for a in 0..2 {
            for b in 0..3 {
                let trace: f64 = (0..3).map(|i| tensors[[a, b, i, i]]).sum();
                for i in 0..3 {
                    reference[[a, b, i, i]] -= trace / 3.0;
                }
            }
        }
        let expected = tensor_to_voigt(&reference).unwrap();
        for (got, want) in deviator.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_von_mises_forms_agree() {
        let strains = sample_strains();
        let from_voigt = von_mises_strain(&strains).unwrap();
        let from_principals = von_mises_strain_from_principals(&strains).unwrap();
        let principals = principal_strains(&strains).unwrap();

        assert_eq!(from_voigt.shape(), &[2, 3]);
        for (n, p) in principals.lanes(Axis(2)).into_iter().enumerate() {
            let expected = (2.0 / 9.0
                * ((p[0] - p[1]).powi(2) + (p[1] - p[2]).powi(2) + (p[2] - p[0]).powi(2)))
            .sqrt();
            let got = from_voigt.iter().nth(n).copied().unwrap();
            assert_abs_diff_eq!(got, expected, epsilon = 1e-12);
        }
        for (a, b) in from_voigt.iter().zip(from_principals.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_von_mises_strain_factor_differs_from_stress() {
        // Same numbers through both forms: ratio is sqrt((2/9) / (1/2)) = 2/3
        let state = ndarray::arr1(&[0.003, -0.001, 0.0005, 0.0002, 0.0, -0.0004]);
        let strain_vm = von_mises_strain(&state).unwrap().sum();
        let stress_vm = crate::stress::von_mises_stress(&state).unwrap().sum();
        assert_abs_diff_eq!(strain_vm / stress_vm, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_signed_von_mises_variants() {
        let strains = sample_strains();
        let vm = von_mises_strain(&strains).unwrap();
        let by_vol = signed_von_mises_by_volumetric(&strains).unwrap();
        let by_principal = signed_von_mises_by_max_abs_principal(&strains).unwrap();
        let by_i1 = signed_von_mises_by_first_invariant(&strains).unwrap();

        // Compression in z: all negative
        assert!(by_vol[[0, 1]] < 0.0 && by_principal[[0, 1]] < 0.0 && by_i1[[0, 1]] < 0.0);
        // Pure volumetric: von Mises zero, signed variants zero
        assert_abs_diff_eq!(vm[[0, 2]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(by_principal[[0, 2]], 0.0, epsilon = 1e-12);
        // Pure shear: (ε1 + ε3)/2 = 0 -> sign defaults to +
        assert_abs_diff_eq!(by_principal[[1, 0]], vm[[1, 0]], epsilon = 1e-12);
        assert_abs_diff_eq!(by_vol[[1, 0]], vm[[1, 0]], epsilon = 1e-12);

        for (s, v) in by_principal.iter().zip(vm.iter()) {
            assert_abs_diff_eq!(s.abs(), *v, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_shape_error() {
        let bad = Array::<f64, _>::zeros((2, 7));
        assert!(matches!(von_mises_strain(&bad), Err(Error::Shape(_))));
        assert!(matches!(volumetric_strain(&bad), Err(Error::Shape(_))));
    }
}
