use blk::{Complex, Field};
use crate::MatTrait;
use super::SpMat;

/// Expands an `m x n` complex system into the equivalent `2m x 2n` real one.
///
/// ```text
///  a + bi  ->  [ a  -b ]
///              [ b   a ]
/// ```
pub fn complex_to_real<T>(m: &SpMat<Complex<T>>) -> SpMat<T>
where T: Field {
    let (r, c) = m.shape();
    let entries = m.iter().flat_map(|(i, j, z)| {
        let (a, b) = (z.re, z.im);
        [
            (2 * i,     2 * j,     a),
            (2 * i,     2 * j + 1, -b),
            (2 * i + 1, 2 * j,     b),
            (2 * i + 1, 2 * j + 1, a),
        ]
    });
    SpMat::from_entries((2 * r, 2 * c), entries)
}

/// `[z_0, z_1, ..] -> [re z_0, im z_0, re z_1, im z_1, ..]`, matching the
/// layout of [`complex_to_real`].
pub fn complex_to_real_vec<T>(v: &[Complex<T>]) -> Vec<T>
where T: Field {
    v.iter().flat_map(|z| [z.re, z.im]).collect()
}
