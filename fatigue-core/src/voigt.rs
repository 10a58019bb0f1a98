//! Conversion between Voigt vectors and symmetric 3x3 tensors.
//!
//! Batched arrays keep the Voigt component axis last: `(..., 6)`. Tensor
//! batches keep the matrix axes last: `(..., 3, 3)`. Any number of leading
//! dimensions is allowed, including none (a single state).
//!
//! Component order is `(11, 22, 33, 23, 13, 12)`:
//!
//! ```text
//! | v0 v5 v4 |
//! | v5 v1 v3 |
//! | v4 v3 v2 |
//! ```

use crate::error::{Error, Result};
use crate::types::{Tensor3, Voigt6};
use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn};
use rayon::prelude::*;

/// Number of Voigt components of a symmetric 3x3 tensor.
pub const VOIGT_COMPONENTS: usize = 6;

/// Validate that the last axis holds the six Voigt components.
///
/// # Errors
///
/// Returns [`Error::Shape`] for 0-dimensional input or when the last axis
/// length is not 6.
pub fn check_shape<S, D>(vector: &ArrayBase<S, D>) -> Result<()>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    match vector.shape().last() {
        None => Err(Error::Shape(
            "expected at least one axis holding 6 Voigt components".into(),
        )),
        Some(&n) if n != VOIGT_COMPONENTS => Err(Error::Shape(format!(
            "last axis has length {}, expected {} Voigt components",
            n, VOIGT_COMPONENTS
        ))),
        Some(_) => Ok(()),
    }
}

/// Validate that the two trailing axes form a 3x3 matrix.
pub fn check_tensor_shape<S, D>(tensor: &ArrayBase<S, D>) -> Result<()>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let shape = tensor.shape();
    if shape.len() < 2 || shape[shape.len() - 2..] != [3, 3] {
        return Err(Error::Shape(format!(
            "expected trailing axes (3, 3), got shape {:?}",
            shape
        )));
    }
    Ok(())
}

/// Build the symmetric tensor of a single Voigt vector.
pub fn to_matrix(v: &Voigt6) -> Tensor3 {
    Tensor3::new(
        v[0], v[5], v[4],
        v[5], v[1], v[3],
        v[4], v[3], v[2],
    )
}

/// Read the Voigt vector of a single tensor (upper triangle).
pub fn from_matrix(t: &Tensor3) -> Voigt6 {
    Voigt6::new(t[(0, 0)], t[(1, 1)], t[(2, 2)], t[(1, 2)], t[(0, 2)], t[(0, 1)])
}

/// Convert a `(..., 6)` Voigt batch to a `(..., 3, 3)` tensor batch.
///
/// # Errors
///
/// Returns [`Error::Shape`] if the last axis is not of length 6.
pub fn voigt_to_tensor<S, D>(vector: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let (leading, states) = collect_states(vector)?;
    let data = states
        .iter()
        .flat_map(|v| {
            let t = to_matrix(v);
            // Row-major so the output reads t[.., i, j]
            (0..3).flat_map(move |i| (0..3).map(move |j| t[(i, j)]))
        })
        .collect();
    assemble(&leading, &[3, 3], data)
}

/// Convert a `(..., 3, 3)` tensor batch back to a `(..., 6)` Voigt batch.
///
/// This is an exact component copy: `tensor_to_voigt(voigt_to_tensor(v)) == v`.
pub fn tensor_to_voigt<S, D>(tensor: &ArrayBase<S, D>) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let (leading, tensors) = collect_tensors(tensor)?;
    let data = tensors
        .iter()
        .flat_map(|t| {
            let v = from_matrix(t);
            (0..VOIGT_COMPONENTS).map(move |k| v[k])
        })
        .collect();
    assemble(&leading, &[VOIGT_COMPONENTS], data)
}

/// Split a validated `(..., 6)` batch into its leading shape and states.
///
/// States are returned in logical (row-major) order of the leading axes.
pub(crate) fn collect_states<S, D>(vector: &ArrayBase<S, D>) -> Result<(Vec<usize>, Vec<Voigt6>)>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    check_shape(vector)?;
    let shape = vector.shape();
    let leading = shape[..shape.len() - 1].to_vec();

    let standard = vector.as_standard_layout();
    let flat = standard
        .as_slice()
        .ok_or_else(|| Error::Shape("input is not contiguous".into()))?;
    let states = flat
        .chunks_exact(VOIGT_COMPONENTS)
        .map(Voigt6::from_row_slice)
        .collect();

    Ok((leading, states))
}

/// Split a validated `(..., 3, 3)` batch into its leading shape and matrices.
pub(crate) fn collect_tensors<S, D>(tensor: &ArrayBase<S, D>) -> Result<(Vec<usize>, Vec<Tensor3>)>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    check_tensor_shape(tensor)?;
    let shape = tensor.shape();
    let leading = shape[..shape.len() - 2].to_vec();

    let standard = tensor.as_standard_layout();
    let flat = standard
        .as_slice()
        .ok_or_else(|| Error::Shape("input is not contiguous".into()))?;
    let tensors = flat.chunks_exact(9).map(Tensor3::from_row_slice).collect();

    Ok((leading, tensors))
}

/// Rebuild an array of shape `leading ++ trailing` from flat row-major data.
pub(crate) fn assemble(leading: &[usize], trailing: &[usize], data: Vec<f64>) -> Result<ArrayD<f64>> {
    let shape: Vec<usize> = leading.iter().chain(trailing).copied().collect();
    ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| Error::Shape(e.to_string()))
}

/// Map every Voigt state of a batch to `K` output values in parallel.
///
/// The output has shape `leading ++ trailing`; `trailing` must multiply to `K`.
pub(crate) fn map_states<S, D, F, const K: usize>(
    vector: &ArrayBase<S, D>,
    trailing: &[usize],
    f: F,
) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
    F: Fn(&Voigt6) -> [f64; K] + Sync + Send,
{
    let (leading, states) = collect_states(vector)?;
    let rows: Vec<[f64; K]> = states.par_iter().map(f).collect();
    assemble(&leading, trailing, rows.into_iter().flatten().collect())
}

/// Map every tensor of a `(..., 3, 3)` batch to `K` output values in parallel.
pub(crate) fn map_tensors<S, D, F, const K: usize>(
    tensor: &ArrayBase<S, D>,
    trailing: &[usize],
    f: F,
) -> Result<ArrayD<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
    F: Fn(&Tensor3) -> [f64; K] + Sync + Send,
{
    let (leading, tensors) = collect_tensors(tensor)?;
    let rows: Vec<[f64; K]> = tensors.par_iter().map(f).collect();
    assemble(&leading, trailing, rows.into_iter().flatten().collect())
}
