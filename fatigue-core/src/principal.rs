//! Principal values and directions of symmetric tensors.
//!
//! Every tensor is decomposed with the symmetric eigen solver of nalgebra
//! (implicit QR on the tridiagonal form). Its eigenvectors are then
//! re-orthonormalized and polished with cyclic Jacobi sweeps on the reduced
//! matrix, and each eigenvalue is taken as the Rayleigh quotient of its
//! polished vector, so `T·d = v·d` holds to a few ulps of `|T|`. Results are
//! re-ordered descending:
//!
//! - values: `v1 ≥ v2 ≥ v3` along the last axis
//! - directions: column `i` of each 3x3 block is the unit eigenvector of `vi`
//!
//! The permutation acts on the eigenvector-index axis (the last one) only;
//! the component axis (second to last) is never reordered.
//!
//! Non-finite input yields NaN values and directions for that tensor instead of
//! an error.

use crate::error::Result;
use crate::types::{Principal3, Tensor3};
use crate::voigt::{assemble, collect_tensors, map_tensors};
use nalgebra::{SymmetricEigen, Vector3};
use ndarray::{ArrayBase, ArrayD, Data, Dimension};
use rayon::prelude::*;

/// Indices of `values` in descending order.
///
/// `total_cmp` gives a deterministic order even for ties and signed zeros,
/// and the sort is stable so equal values keep the solver's order.
fn descending_order(values: &Vector3<f64>) -> [usize; 3] {
    let mut order = [0, 1, 2];
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}

#[inline]
fn is_finite(t: &Tensor3) -> bool {
    t.iter().all(|x| x.is_finite())
}

/// Upper bound on Jacobi polishing sweeps.
const POLISH_SWEEPS: usize = 8;

/// Cyclic Jacobi sweeps on a symmetric matrix, returning the accumulated
/// rotation `J` with `Jᵀ·A·J` diagonal.
fn jacobi_rotation(mut a: Tensor3) -> Tensor3 {
    let mut rotation = Tensor3::identity();
    for _ in 0..POLISH_SWEEPS {
        let mut rotated = false;
        for (p, q) in [(0, 1), (0, 2), (1, 2)] {
            let apq = a[(p, q)];
            if apq == 0.0 {
                continue;
            }
            rotated = true;

            let theta = (a[(q, q)] - a[(p, p)]) / (2.0 * apq);
            let t = 1.0_f64.copysign(theta) / (theta.abs() + (theta * theta + 1.0).sqrt());
            let c = 1.0 / (t * t + 1.0).sqrt();
            let s = t * c;

            for k in 0..3 {
                let (akp, akq) = (a[(k, p)], a[(k, q)]);
                a[(k, p)] = c * akp - s * akq;
                a[(k, q)] = s * akp + c * akq;
            }
            for k in 0..3 {
                let (apk, aqk) = (a[(p, k)], a[(q, k)]);
                a[(p, k)] = c * apk - s * aqk;
                a[(q, k)] = s * apk + c * aqk;
            }
            a[(p, q)] = 0.0;
            a[(q, p)] = 0.0;

            for k in 0..3 {
                let (vkp, vkq) = (rotation[(k, p)], rotation[(k, q)]);
                rotation[(k, p)] = c * vkp - s * vkq;
                rotation[(k, q)] = s * vkp + c * vkq;
            }
        }
        if !rotated {
            break;
        }
    }
    rotation
}

/// Eigenpairs of a finite symmetric tensor, unsorted.
fn polished_eigen(t: &Tensor3) -> (Principal3, Tensor3) {
    let eigen = SymmetricEigen::new(*t);

    // Orthonormal start basis, then diagonalize T in that basis
    let basis = eigen.eigenvectors.qr().q();
    let reduced = basis.transpose() * t * basis;
    let reduced = 0.5 * (reduced + reduced.transpose());
    let mut vectors = basis * jacobi_rotation(reduced);

    for i in 0..3 {
        vectors.column_mut(i).normalize_mut();
    }
    let values = Principal3::from_fn(|i, _| {
        let d = vectors.column(i);
        let td = t * d;
        d.dot(&td)
    });
    (values, vectors)
}

/// Principal values of a single symmetric tensor, descending.
pub fn values_sorted(t: &Tensor3) -> Principal3 {
    eigen_sorted(t).0
}

/// Principal values and aligned directions of a single symmetric tensor.
pub fn eigen_sorted(t: &Tensor3) -> (Principal3, Tensor3) {
    if !is_finite(t) {
        return (Principal3::repeat(f64::NAN), Tensor3::repeat(f64::NAN));
    }
    let (values, vectors) = polished_eigen(t);
    let order = descending_order(&values);

    let sorted = Principal3::from_fn(|i, _| values[order[i]]);
    let directions = Tensor3::from_fn(|row, col| vectors[(row, order[col])]);
    (sorted, directions)
}

/// Principal values of a `(..., 3, 3)` tensor batch, shape `(..., 3)`.
///
/// # Errors
///
/// Returns [`Error::Shape`](crate::Error::Shape) if the trailing axes are not 3x3.
pub fn principal_values<S, D>(tensor: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    map_tensors(tensor, &[3], |t| {
        let v = values_sorted(t);
        [v[0], v[1], v[2]]
    })
}

/// Principal values `(..., 3)` and directions `(..., 3, 3)` of a tensor batch.
pub fn principal_values_and_directions<S, D>(
    tensor: &ArrayBase<S, D>,
) -> Result<(ArrayD<f64>, ArrayD<f64>)>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let (leading, tensors) = collect_tensors(tensor)?;
    decompose(&leading, &tensors)
}

/// Decompose already collected tensors and lay the results out as arrays.
pub(crate) fn decompose(
    leading: &[usize],
    tensors: &[Tensor3],
) -> Result<(ArrayD<f64>, ArrayD<f64>)> {
    let pairs: Vec<(Principal3, Tensor3)> = tensors.par_iter().map(eigen_sorted).collect();

    let mut values = Vec::with_capacity(pairs.len() * 3);
    let mut directions = Vec::with_capacity(pairs.len() * 9);
    for (v, d) in &pairs {
        values.extend(v.iter());
        for row in 0..3 {
            for col in 0..3 {
                directions.push(d[(row, col)]);
            }
        }
    }

    Ok((
        assemble(leading, &[3], values)?,
        assemble(leading, &[3, 3], directions)?,
    ))
}
