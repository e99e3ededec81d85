use log::trace;
use blk::Field;
use crate::{MatTrait, MatError};
use super::SpMat;

// factor applied to the mean modulus of the stored entries when no
// absolute tolerance is given.
const RELATIVE_EPS: f64 = 1e-8;

pub fn check_finite<R>(m: &SpMat<R>) -> Result<(), MatError>
where R: Field {
    match m.iter().find(|(_, _, a)| !a.is_finite()) {
        Some((row, col, _)) => Err(MatError::NotFinite { row, col }),
        None => Ok(())
    }
}

pub fn check_finite_vec<R>(v: &[R]) -> Result<(), MatError>
where R: Field {
    match v.iter().position(|a| !a.is_finite()) {
        Some(row) => Err(MatError::NotFinite { row, col: 0 }),
        None => Ok(())
    }
}

/// Fails if some `|a_ij - a_ji| > eps`. A negative `eps` is replaced by
/// `1e-8` times the mean modulus of the stored entries.
pub fn check_symmetric<R>(m: &SpMat<R>, eps: f64) -> Result<(), MatError>
where R: Field {
    check_mirrored(m, eps, false)
}

/// Same as [`check_symmetric`], comparing `a_ij` with `conj(a_ji)`.
/// Coincides with it for real matrices.
pub fn check_hermitian<R>(m: &SpMat<R>, eps: f64) -> Result<(), MatError>
where R: Field {
    check_mirrored(m, eps, true)
}

fn check_mirrored<R>(m: &SpMat<R>, eps: f64, conj: bool) -> Result<(), MatError>
where R: Field {
    if !m.is_square() {
        return Err(MatError::not_square("symmetry check", m.shape()))
    }

    let eps = if eps < 0.0 { relative_eps(m) } else { eps };
    trace!("symmetry check: {:?}, eps: {eps:e}, conj: {conj}", m.shape());

    for (row, col, a) in m.iter() {
        let b = m.get(col, row).copied().unwrap_or_else(R::zero);
        let b = if conj { b.conj() } else { b };
        let diff = (*a - b).abs_val();

        if diff > eps {
            let e = if conj {
                MatError::NotHermitian { row, col, diff, eps }
            } else {
                MatError::NotSymmetric { row, col, diff, eps }
            };
            return Err(e)
        }
    }

    Ok(())
}

fn relative_eps<R>(m: &SpMat<R>) -> f64
where R: Field {
    let nnz = m.nnz();
    if nnz == 0 {
        return 0.0
    }
    let total = m.iter().map(|(_, _, a)| a.abs_val()).sum::<f64>();
    RELATIVE_EPS * total / (nnz as f64)
}
