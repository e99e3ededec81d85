use std::fmt::{Debug, Display};
use std::iter::zip;
use itertools::Itertools;
use nalgebra_sparse::{CscMatrix, CooMatrix, SparseEntry};
use nalgebra_sparse::na::Scalar;
use num_traits::{Zero, One};
use sprs::PermView;
use blk::Field;
use crate::{MatTrait, MatError};

/// Offset used by [`SpMat::shift_diag_default`].
pub const DEFAULT_DIAG_SHIFT: f64 = 1e-4;

#[derive(Clone, PartialEq, Eq)]
pub struct SpMat<R> {
    inner: CscMatrix<R>
}

impl<R> MatTrait for SpMat<R> {
    fn shape(&self) -> (usize, usize) {
        (self.inner.nrows(), self.inner.ncols())
    }
}

impl<R> SpMat<R> {
    #[allow(unused)]
    pub(crate) fn inner(&self) -> &CscMatrix<R> {
        &self.inner
    }

    pub fn data(&self) -> (&[usize], &[usize], &[R]) {
        self.inner.csc_data()
    }

    pub fn disassemble(self) -> (Vec<usize>, Vec<usize>, Vec<R>) {
        self.inner.disassemble()
    }

    pub fn zero(shape: (usize, usize)) -> Self {
        let csc = CscMatrix::zeros(shape.0, shape.1);
        Self::from(csc)
    }

    pub fn is_zero(&self) -> bool
    where R: Zero {
        self.inner.values().iter().all(|a| a.is_zero())
    }

    pub fn id(n: usize) -> Self
    where R: Scalar + One {
        let csc = CscMatrix::identity(n);
        Self::from(csc)
    }

    /// Stored entries in column-major order, explicit zeros included.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &R)> {
        self.inner.triplet_iter()
    }

    pub fn nnz(&self) -> usize {
        self.inner.nnz()
    }

    /// The stored entry at `(i, j)`, `None` if it is structurally zero or
    /// out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<&R> {
        match self.inner.get_entry(i, j)? {
            SparseEntry::NonZero(a) => Some(a),
            SparseEntry::Zero => None
        }
    }
}

impl<R> SpMat<R>
where R: Field {
    /// Assembles a matrix from triplets. Entries at the same position are
    /// summed, zero inputs are dropped.
    ///
    /// # Panics
    /// If an index is out of the given shape.
    pub fn from_entries<T>(shape: (usize, usize), entries: T) -> Self
    where T: IntoIterator<Item = (usize, usize, R)> {
        Self::from_stored_entries(shape, entries.into_iter().filter(|(_, _, a)| !a.is_zero()))
    }

    // as `from_entries`, but explicit zeros are stored. Used when moving
    // entries of an existing matrix, so that its structure is kept.
    pub(crate) fn from_stored_entries<T>(shape: (usize, usize), entries: T) -> Self
    where T: IntoIterator<Item = (usize, usize, R)> {
        let mut coo = CooMatrix::new(shape.0, shape.1);
        for (i, j, a) in entries {
            coo.push(i, j, a)
        }
        let csc = CscMatrix::from(&coo);
        Self::from(csc)
    }

    pub fn from_dense_data<I>(shape: (usize, usize), data: I) -> Self
    where I: IntoIterator<Item = R> {
        let n = shape.1;
        Self::from_entries(
            shape,
            data.into_iter().enumerate().map(|(k, a)| {
                let (i, j) = (k / n, k % n);
                (i, j, a)
            })
        )
    }

    pub fn to_dense(&self) -> Vec<Vec<R>> {
        let (m, n) = self.shape();
        let mut res = vec![vec![R::zero(); n]; m];
        for (i, j, a) in self.iter() {
            res[i][j] += *a;
        }
        res
    }

    pub fn transpose(&self) -> Self {
        self.inner.transpose().into()
    }

    pub fn extract<F>(&self, shape: (usize, usize), f: F) -> SpMat<R>
    where F: Fn(usize, usize) -> Option<(usize, usize)> {
        SpMat::from_stored_entries(shape, self.iter().filter_map(|(i, j, a)|
            f(i, j).map(|(i, j)| (i, j, *a))
        ))
    }

    pub fn permute(&self, p: PermView, q: PermView) -> SpMat<R> {
        self.extract(self.shape(), |i, j| Some((p.at(i), q.at(j))))
    }

    fn place<'a, I>(shape: (usize, usize), blocks: I) -> Self
    where I: IntoIterator<Item = (&'a SpMat<R>, (usize, usize))> {
        let entries = blocks.into_iter().flat_map(|(x, (di, dj))|
            x.iter().map(move |(i, j, a)|
                (i + di, j + dj, *a)
            )
        );
        Self::from_stored_entries(shape, entries)
    }

    //  [a  b]
    //  [c  d]
    pub fn combine_blocks(blocks: [&SpMat<R>; 4]) -> SpMat<R> {
        let [a, b, c, d] = blocks;

        assert_eq!(a.nrows(), b.nrows());
        assert_eq!(c.nrows(), d.nrows());
        assert_eq!(a.ncols(), c.ncols());
        assert_eq!(b.ncols(), d.ncols());

        let (m, n) = (a.nrows() + c.nrows(), a.ncols() + b.ncols());
        let (k, l) = a.shape();

        Self::place((m, n), zip(
            [a, b, c, d],
            [(0,0), (0,l), (k,0), (k,l)]
        ))
    }

    /// Stacks matrices on top of each other. All must have the same number
    /// of columns. An empty list gives the 0x0 matrix.
    pub fn vstack(mats: &[SpMat<R>]) -> Result<Self, MatError> {
        let Some(first) = mats.first() else {
            return Ok(Self::zero((0, 0)))
        };

        let n = first.ncols();
        if let Some(x) = mats.iter().find(|x| x.ncols() != n) {
            return Err(MatError::DimensionMismatch(
                format!("vstack: expected {n} columns, found {}", x.ncols())
            ))
        }

        let offsets = mats.iter().scan(0, |k, x| {
            let di = *k;
            *k += x.nrows();
            Some((di, 0))
        }).collect_vec();
        let m = mats.iter().map(|x| x.nrows()).sum();

        Ok(Self::place((m, n), zip(mats, offsets)))
    }

    /// Places matrices side by side. All must have the same number of rows.
    /// An empty list gives the 0x0 matrix.
    pub fn hstack(mats: &[SpMat<R>]) -> Result<Self, MatError> {
        let Some(first) = mats.first() else {
            return Ok(Self::zero((0, 0)))
        };

        let m = first.nrows();
        if let Some(x) = mats.iter().find(|x| x.nrows() != m) {
            return Err(MatError::DimensionMismatch(
                format!("hstack: expected {m} rows, found {}", x.nrows())
            ))
        }

        let offsets = mats.iter().scan(0, |k, x| {
            let dj = *k;
            *k += x.ncols();
            Some((0, dj))
        }).collect_vec();
        let n = mats.iter().map(|x| x.ncols()).sum();

        Ok(Self::place((m, n), zip(mats, offsets)))
    }

    /// `self += shift * I`.
    pub fn shift_diag(&mut self, shift: R) -> Result<(), MatError> {
        if !self.is_square() {
            return Err(MatError::not_square("shift_diag", self.shape()))
        }

        let n = self.nrows();
        let entries = self.iter().map(|(i, j, a)|
            (i, j, *a)
        ).chain((0..n).map(|i|
            (i, i, shift)
        )).collect_vec();

        *self = Self::from_entries((n, n), entries);
        Ok(())
    }

    pub fn shift_diag_default(&mut self) -> Result<(), MatError> {
        self.shift_diag(R::from_f64(DEFAULT_DIAG_SHIFT))
    }

    pub fn mul_vec(&self, x: &[R]) -> Result<Vec<R>, MatError> {
        if x.len() != self.ncols() {
            return Err(MatError::size_mismatch("vector", self.ncols(), x.len()))
        }

        let mut y = vec![R::zero(); self.nrows()];
        for (i, j, a) in self.iter() {
            y[i] += *a * x[j];
        }
        Ok(y)
    }
}

impl<R> From<CscMatrix<R>> for SpMat<R> {
    fn from(inner: CscMatrix<R>) -> Self {
        Self { inner }
    }
}

impl<R> Default for SpMat<R> {
    fn default() -> Self {
        Self::zero((0, 0))
    }
}

impl<R> Display for SpMat<R>
where R: Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (m, n) = self.shape();
        write!(f, "SpMat({m}x{n}, nnz: {})", self.nnz())?;
        for (i, j, a) in self.iter() {
            write!(f, "\n  ({i}, {j}): {a}")?;
        }
        Ok(())
    }
}

impl<R> Debug for SpMat<R>
where R: Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.inner, f)
    }
}

#[cfg(feature = "serde")]
impl<R> serde::Serialize for SpMat<R>
where R: Clone + serde::Serialize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: serde::Serializer {
        self.inner.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, R> serde::Deserialize<'de> for SpMat<R>
where R: Clone + serde::Deserialize<'de> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: serde::Deserializer<'de> {
        let inner = CscMatrix::deserialize(deserializer)?;
        let res = Self::from(inner);
        Ok(res)
    }
}

#[cfg(test)]
impl<R> SpMat<R>
where R: Field {
    // small nonzero integers, so that sums stay exact.
    pub(crate) fn rand<G>(shape: (usize, usize), density: f64, rng: &mut G) -> Self
    where G: rand::Rng {
        use cartesian::cartesian;

        let (m, n) = shape;
        let range = cartesian!(0..m, 0..n);
        let entries = range.filter_map(|(i, j)|
            if rng.gen::<f64>() < density {
                let a = rng.gen_range(1..10) as f64;
                Some((i, j, R::from_f64(a)))
            } else {
                None
            }
        ).collect_vec();

        Self::from_entries(shape, entries)
    }
}
