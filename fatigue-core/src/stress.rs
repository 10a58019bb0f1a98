//! Stress invariants and equivalent stresses over Voigt batches.
//!
//! Every function takes a `(..., 6)` stress batch in Voigt notation, checks the
//! trailing axis first, and evaluates each state independently (in parallel):
//!
//! 1. Principal stresses and directions (σ1 ≥ σ2 ≥ σ3)
//! 2. Invariants, hydrostatic stress and deviator
//! 3. Von Mises and Tresca equivalents and their signed variants
//!
//! Leading dimensions are preserved; the Voigt axis is reduced (scalars),
//! replaced (`3` for principals/invariants) or kept (`6` for the deviator).

use crate::error::Result;
use crate::principal;
use crate::sign::{SignReference, SignTolerance};
use crate::types::StressTensor;
use crate::voigt::{collect_states, map_states, to_matrix};
use ndarray::{ArrayBase, ArrayD, Data, Dimension};

/// Principal stresses, shape `(..., 3)`, descending.
pub fn principal_stresses<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(stress, &[3], |v| {
        let p = StressTensor(*v).principal();
        [p[0], p[1], p[2]]
    })
}

/// Principal stresses `(..., 3)` and directions `(..., 3, 3)`.
///
/// Column `i` of each direction block is the unit vector of σi.
pub fn principal_stresses_and_directions<S, D>(
    stress: &ArrayBase<S, D>,
) -> Result<(ArrayD<f64>, ArrayD<f64>)>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let (leading, states) = collect_states(stress)?;
    let tensors: Vec<_> = states.iter().map(to_matrix).collect();
    principal::decompose(&leading, &tensors)
}

/// Principal directions only, shape `(..., 3, 3)`.
pub fn principal_directions<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    principal_stresses_and_directions(stress).map(|(_, directions)| directions)
}

/// Stress invariants `(I1, I2, I3)`, shape `(..., 3)`.
pub fn stress_invariants<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(stress, &[3], |v| {
        let inv = StressTensor(*v).invariants();
        [inv[0], inv[1], inv[2]]
    })
}

/// Hydrostatic (mean normal) stress, shape `(...)`.
pub fn hydrostatic_stress<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(stress, &[], |v| [StressTensor(*v).hydrostatic()])
}

/// Stress deviator in Voigt form, shape `(..., 6)`.
///
/// Shear components are unchanged.
pub fn stress_deviator<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(stress, &[6], |v| {
        let d = StressTensor(*v).deviator().0;
        [d[0], d[1], d[2], d[3], d[4], d[5]]
    })
}

/// Von Mises equivalent stress, shape `(...)`.
///
/// σ_vM = sqrt(½[(σ11−σ22)² + (σ22−σ33)² + (σ33−σ11)² + 6(σ12² + σ23² + σ13²)])
pub fn von_mises_stress<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(stress, &[], |v| [StressTensor(*v).von_mises()])
}

/// Tresca (maximum shear) stress (σ1 − σ3)/2, shape `(...)`.
pub fn tresca_stress<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(stress, &[], |v| [StressTensor(*v).tresca()])
}

/// Von Mises stress signed by `reference`, shape `(...)`.
pub fn signed_von_mises_stress<S, D>(
    stress: &ArrayBase<S, D>,
    reference: SignReference,
    tolerance: SignTolerance,
) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(stress, &[], |v| [StressTensor(*v).signed_von_mises(reference, tolerance)])
}

/// Tresca stress signed by `reference`, shape `(...)`.
pub fn signed_tresca_stress<S, D>(
    stress: &ArrayBase<S, D>,
    reference: SignReference,
    tolerance: SignTolerance,
) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_states(stress, &[], |v| [StressTensor(*v).signed_tresca(reference, tolerance)])
}

/// Von Mises stress signed by the hydrostatic stress.
pub fn signed_von_mises_by_hydrostatic<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    signed_von_mises_stress(stress, SignReference::Hydrostatic, SignTolerance::default())
}

/// Von Mises stress signed by (σ1 + σ3)/2.
pub fn signed_von_mises_by_max_abs_principal<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    signed_von_mises_stress(stress, SignReference::MaxAbsPrincipal, SignTolerance::default())
}

/// Von Mises stress signed by the first invariant.
pub fn signed_von_mises_by_first_invariant<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    signed_von_mises_stress(stress, SignReference::FirstInvariant, SignTolerance::default())
}

/// Tresca stress signed by the hydrostatic stress.
pub fn signed_tresca_by_hydrostatic<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    signed_tresca_stress(stress, SignReference::Hydrostatic, SignTolerance::default())
}

/// Tresca stress signed by (σ1 + σ3)/2.
pub fn signed_tresca_by_max_abs_principal<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    signed_tresca_stress(stress, SignReference::MaxAbsPrincipal, SignTolerance::default())
}

/// Tresca stress signed by the first invariant.
pub fn signed_tresca_by_first_invariant<S, D>(stress: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    signed_tresca_stress(stress, SignReference::FirstInvariant, SignTolerance::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::voigt::voigt_to_tensor;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::Matrix3;
    use ndarray::{arr1, arr2, Array, Array2, Axis};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Uniaxial x, uniaxial compression z, hydrostatic, pure shear, mixed.
    fn sample_stresses() -> Array2<f64> {
        let r2 = 2.0_f64.sqrt();
        arr2(&[
            [100.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, -50.0, 0.0, 0.0, 0.0],
            [30.0, 30.0, 30.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 40.0],
            [r2, -r2, 0.0, 0.0, 0.0, r2],
        ])
    }

    #[test]
    fn test_principal_stresses_values() {
        let principals = principal_stresses(&sample_stresses()).unwrap();
        let expected = arr2(&[
            [100.0, 0.0, 0.0],
            [0.0, 0.0, -50.0],
            [30.0, 30.0, 30.0],
            [40.0, 0.0, -40.0],
            [2.0, 0.0, -2.0],
        ]);
        assert_eq!(principals.shape(), &[5, 3]);
        for (got, want) in principals.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_principal_directions_eigen_relation() {
        let stresses = sample_stresses();
        let (principals, directions) = principal_stresses_and_directions(&stresses).unwrap();
        let tensors = voigt_to_tensor(&stresses).unwrap();
        assert_eq!(directions.shape(), &[5, 3, 3]);

        for n in 0..stresses.nrows() {
            let t = tensors.index_axis(Axis(0), n);
            let d = directions.index_axis(Axis(0), n);
            for i in 0..3 {
                for row in 0..3 {
                    let av: f64 = (0..3).map(|k| t[[row, k]] * d[[k, i]]).sum();
                    assert_abs_diff_eq!(av, principals[[n, i]] * d[[row, i]], epsilon = 1e-12);
                }
            }
        }

        let only_directions = principal_directions(&stresses).unwrap();
        assert_eq!(only_directions, directions);
    }

    #[test]
    fn test_invariants_and_hydrostatic_deviator() {
        let stresses = sample_stresses();
        let invariants = stress_invariants(&stresses).unwrap();
        let hydro = hydrostatic_stress(&stresses).unwrap();
        let deviator = stress_deviator(&stresses).unwrap();

        assert_eq!(invariants.shape(), &[5, 3]);
        assert_eq!(hydro.shape(), &[5]);
        assert_eq!(deviator.shape(), &[5, 6]);

        // Hydrostatic case: zero deviator, I1 = 90, I2 = 2700, I3 = 27000
        for k in 0..6 {
            assert_abs_diff_eq!(deviator[[2, k]], 0.0, epsilon = 1e-12);
        }
        assert_relative_eq!(invariants[[2, 0]], 90.0, epsilon = 1e-12);
        assert_relative_eq!(invariants[[2, 1]], 2700.0, epsilon = 1e-9);
        assert_relative_eq!(invariants[[2, 2]], 27000.0, epsilon = 1e-8);
        assert_relative_eq!(hydro[[2]], 30.0, epsilon = 1e-12);
        assert_relative_eq!(hydro[[0]], 100.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_first_invariant_matches_trace_random() {
        let mut rng = StdRng::seed_from_u64(42);
        let stresses = Array::from_shape_fn((64, 6), |_| rng.gen_range(-500.0..500.0));
        let invariants = stress_invariants(&stresses).unwrap();

        for (n, row) in stresses.axis_iter(Axis(0)).enumerate() {
            let m = Matrix3::new(
                row[0], row[5], row[4],
                row[5], row[1], row[3],
                row[4], row[3], row[2],
            );
            assert_relative_eq!(invariants[[n, 0]], m.trace(), epsilon = 1e-9);
            let i2 = 0.5 * (m.trace().powi(2) - (m * m).trace());
            assert_relative_eq!(invariants[[n, 1]], i2, epsilon = 1e-6, max_relative = 1e-12);
            assert_relative_eq!(invariants[[n, 2]], m.determinant(), epsilon = 1e-3, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_von_mises_and_signed_variants() {
        let stresses = sample_stresses();
        let vm = von_mises_stress(&stresses).unwrap();
        let svm_h = signed_von_mises_by_hydrostatic(&stresses).unwrap();
        let svm_p = signed_von_mises_by_max_abs_principal(&stresses).unwrap();
        let svm_i1 = signed_von_mises_by_first_invariant(&stresses).unwrap();

        assert_eq!(vm.shape(), &[5]);
        assert!(vm.iter().all(|&v| v >= 0.0));

        // Hydrostatic: everything vanishes
        assert_abs_diff_eq!(vm[[2]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(svm_h[[2]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(svm_p[[2]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(svm_i1[[2]], 0.0, epsilon = 1e-12);

        // Pure shear τ = 40: √3·40, sign defaults to + (all references zero)
        assert_relative_eq!(vm[[3]], 40.0 * 3.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(svm_h[[3]], vm[[3]]);
        assert_relative_eq!(svm_i1[[3]], vm[[3]]);
        assert_abs_diff_eq!(svm_p[[3]], vm[[3]], epsilon = 1e-12);

        // Compression in z: negative for every convention
        assert_relative_eq!(svm_h[[1]], -50.0, epsilon = 1e-12);
        assert_relative_eq!(svm_p[[1]], -50.0, epsilon = 1e-12);
        assert_relative_eq!(svm_i1[[1]], -50.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tresca_and_signed_variants() {
        let stresses = sample_stresses();
        let tresca = tresca_stress(&stresses).unwrap();
        let st_h = signed_tresca_by_hydrostatic(&stresses).unwrap();
        let st_p = signed_tresca_by_max_abs_principal(&stresses).unwrap();
        let st_i1 = signed_tresca_by_first_invariant(&stresses).unwrap();

        assert_eq!(tresca.shape(), &[5]);
        assert_abs_diff_eq!(tresca[[2]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(st_h[[2]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(st_p[[2]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(st_i1[[2]], 0.0, epsilon = 1e-12);

        assert_relative_eq!(tresca[[0]], 50.0, epsilon = 1e-12);
        assert_relative_eq!(tresca[[3]], 40.0, epsilon = 1e-12);
        assert_relative_eq!(st_h[[1]], -25.0, epsilon = 1e-12);
        assert_relative_eq!(st_p[[1]], -25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_state_and_leading_dims() {
        let single = arr1(&[100.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let vm = von_mises_stress(&single).unwrap();
        assert_eq!(vm.ndim(), 0);
        assert_relative_eq!(vm.sum(), 100.0, epsilon = 1e-12);

        let stacked = Array::from_shape_fn((4, 5, 6), |(_, j, k)| sample_stresses()[[j, k]]);
        let vm = von_mises_stress(&stacked).unwrap();
        assert_eq!(vm.shape(), &[4, 5]);
        let reference = von_mises_stress(&sample_stresses()).unwrap();
        for t in 0..4 {
            for n in 0..5 {
                assert_eq!(vm[[t, n]], reference[[n]]);
            }
        }
    }

    #[test]
    fn test_custom_tolerance() {
        // Hydrostatic -1e-4 is "zero" only under a looser tolerance
        let stresses = arr2(&[[10.0, -10.0003, 0.0, 0.0, 0.0, 0.0]]);
        let strict = signed_von_mises_stress(&stresses, SignReference::Hydrostatic, SignTolerance::default())
            .unwrap();
        let loose = signed_von_mises_stress(
            &stresses,
            SignReference::Hydrostatic,
            SignTolerance { rtol: 0.0, atol: 1e-3 },
        )
        .unwrap();
        assert!(strict[[0]] < 0.0);
        assert!(loose[[0]] > 0.0);
    }

    #[test]
    fn test_shape_error_before_computation() {
        let bad = Array::<f64, _>::zeros((3, 5));
        assert!(matches!(von_mises_stress(&bad), Err(Error::Shape(_))));
        assert!(matches!(tresca_stress(&bad), Err(Error::Shape(_))));
        assert!(matches!(principal_stresses_and_directions(&bad), Err(Error::Shape(_))));
        assert!(matches!(signed_von_mises_by_hydrostatic(&bad), Err(Error::Shape(_))));
    }
}
