use log::trace;
use sprs::PermOwned;
use crate::MatError;

/// Stable two-way split of the index set `0..n` into `A` and `B`.
///
/// Within each side the original relative order is kept, so `i < j` in the
/// same side implies `new_ind(i) < new_ind(j)`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "PartitionData", into = "PartitionData"))]
pub struct Partition {
    orig_inds_a: Vec<usize>,
    orig_inds_b: Vec<usize>,
    new_inds: Vec<usize>,
    is_a: Vec<bool>,
}

impl Partition {
    /// `mask[i] == true` puts `i` into `A`. Fails if `mask.len() != n`.
    pub fn new(n: usize, mask: &[bool]) -> Result<Self, MatError> {
        if mask.len() != n {
            return Err(MatError::size_mismatch("partition mask", n, mask.len()))
        }

        let mut orig_inds_a = vec![];
        let mut orig_inds_b = vec![];

        let new_inds = mask.iter().enumerate().map(|(i, &a)| {
            let list = if a { &mut orig_inds_a } else { &mut orig_inds_b };
            list.push(i);
            list.len() - 1
        }).collect();

        trace!("partition: {n} -> {} + {}", orig_inds_a.len(), orig_inds_b.len());

        Ok(Self {
            orig_inds_a,
            orig_inds_b,
            new_inds,
            is_a: mask.to_vec()
        })
    }

    /// Puts the listed indices into `A` and the rest into `B`.
    /// Duplicates are allowed.
    pub fn from_indices<'a, I>(n: usize, a_inds: I) -> Result<Self, MatError>
    where I: IntoIterator<Item = &'a usize> {
        let mut mask = vec![false; n];
        for &i in a_inds {
            if i >= n {
                return Err(MatError::IndexOutOfRange { index: i, dim: n })
            }
            mask[i] = true;
        }
        Self::new(n, &mask)
    }

    pub fn dim(&self) -> usize {
        self.is_a.len()
    }

    pub fn dim_a(&self) -> usize {
        self.orig_inds_a.len()
    }

    pub fn dim_b(&self) -> usize {
        self.orig_inds_b.len()
    }

    pub fn orig_inds_a(&self) -> &[usize] {
        &self.orig_inds_a
    }

    pub fn orig_inds_b(&self) -> &[usize] {
        &self.orig_inds_b
    }

    pub fn new_inds(&self) -> &[usize] {
        &self.new_inds
    }

    pub fn is_a(&self) -> &[bool] {
        &self.is_a
    }

    #[inline]
    pub fn is_in_a(&self, i: usize) -> bool {
        self.is_a[i]
    }

    #[inline]
    pub fn new_ind(&self, i: usize) -> usize {
        self.new_inds[i]
    }

    /// Maps each original index to its position in the concatenated
    /// order `[A; B]`.
    pub fn perm(&self) -> PermOwned {
        let na = self.dim_a();
        let p = (0..self.dim()).map(|i|
            if self.is_a[i] {
                self.new_inds[i]
            } else {
                na + self.new_inds[i]
            }
        ).collect();
        PermOwned::new(p)
    }

    pub fn split_vec<T>(&self, v: &[T]) -> Result<(Vec<T>, Vec<T>), MatError>
    where T: Clone {
        if v.len() != self.dim() {
            return Err(MatError::size_mismatch("vector", self.dim(), v.len()))
        }

        let pick = |inds: &[usize]| -> Vec<T> {
            inds.iter().map(|&i| v[i].clone()).collect()
        };
        Ok((pick(&self.orig_inds_a), pick(&self.orig_inds_b)))
    }

    /// Inverse of [`Partition::split_vec`].
    pub fn merge_vecs<T>(&self, va: &[T], vb: &[T]) -> Result<Vec<T>, MatError>
    where T: Clone {
        if va.len() != self.dim_a() {
            return Err(MatError::size_mismatch("A-vector", self.dim_a(), va.len()))
        }
        if vb.len() != self.dim_b() {
            return Err(MatError::size_mismatch("B-vector", self.dim_b(), vb.len()))
        }

        let v = (0..self.dim()).map(|i| {
            let k = self.new_inds[i];
            if self.is_a[i] { va[k].clone() } else { vb[k].clone() }
        }).collect();

        Ok(v)
    }
}

// serialized form of `Partition`. Deserialization rebuilds the index lists
// from `is_a` and rejects data that disagrees with them.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct PartitionData {
    orig_inds_a: Vec<usize>,
    orig_inds_b: Vec<usize>,
    new_inds: Vec<usize>,
    is_a: Vec<bool>,
}

#[cfg(feature = "serde")]
impl From<Partition> for PartitionData {
    fn from(p: Partition) -> Self {
        let Partition { orig_inds_a, orig_inds_b, new_inds, is_a } = p;
        Self { orig_inds_a, orig_inds_b, new_inds, is_a }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<PartitionData> for Partition {
    type Error = MatError;

    fn try_from(data: PartitionData) -> Result<Self, Self::Error> {
        let p = Partition::new(data.is_a.len(), &data.is_a)?;
        if p.orig_inds_a != data.orig_inds_a || p.orig_inds_b != data.orig_inds_b || p.new_inds != data.new_inds {
            return Err(MatError::InvalidPartition(
                "index lists do not match the membership mask".into()
            ))
        }
        Ok(p)
    }
}
