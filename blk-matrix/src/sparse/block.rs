use std::iter::zip;
use derive_more::Display;
use log::{debug, trace};
use blk::Field;
use crate::{MatTrait, MatError};
use super::{SpMat, Partition};

//          A    B
//       [ AA   AB ]  A
//  m ~  [         ]
//       [ BA   BB ]  B
//
// rows and columns are reordered by `Partition::perm()`.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
pub enum Block {
    #[display("AA")] AA,
    #[display("AB")] AB,
    #[display("BA")] BA,
    #[display("BB")] BB,
}

impl Block {
    pub const ALL: [Block; 4] = [Block::AA, Block::AB, Block::BA, Block::BB];

    pub fn of(row_in_a: bool, col_in_a: bool) -> Self {
        match (row_in_a, col_in_a) {
            (true,  true)  => Block::AA,
            (true,  false) => Block::AB,
            (false, true)  => Block::BA,
            (false, false) => Block::BB,
        }
    }

    pub fn shape(&self, part: &Partition) -> (usize, usize) {
        let (na, nb) = (part.dim_a(), part.dim_b());
        match self {
            Block::AA => (na, na),
            Block::AB => (na, nb),
            Block::BA => (nb, na),
            Block::BB => (nb, nb),
        }
    }
}

/// The four blocks of a square sparse matrix under a [`Partition`].
///
/// `bb` is `None` when the decomposition was asked to skip it. It is never
/// substituted by a zero matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockDecomp<R> {
    part: Partition,
    aa: SpMat<R>,
    ab: SpMat<R>,
    ba: SpMat<R>,
    bb: Option<SpMat<R>>,
}

/// Splits `m` into `AA`, `AB`, `BA` and (if `include_bb`) `BB`.
///
/// Every stored entry `(i, j, a)` of `m` goes to exactly one block, at
/// `(new_ind(i), new_ind(j))`. Entries landing on the same position are
/// summed. Explicitly stored zeros of `m` are carried into the blocks, so
/// the block nnz counts add up to `m.nnz()` when no entries coincide.
pub fn block_decompose<R>(m: &SpMat<R>, part: &Partition, include_bb: bool) -> Result<BlockDecomp<R>, MatError>
where R: Field {
    BlockDecomp::decompose(m, part.clone(), include_bb)
}

impl<R> BlockDecomp<R>
where R: Field {
    pub fn new(m: &SpMat<R>, mask: &[bool], include_bb: bool) -> Result<Self, MatError> {
        if !m.is_square() {
            return Err(MatError::not_square("block decompose", m.shape()))
        }
        let part = Partition::new(m.nrows(), mask)?;
        Self::decompose(m, part, include_bb)
    }

    pub fn full(m: &SpMat<R>, mask: &[bool]) -> Result<Self, MatError> {
        Self::new(m, mask, true)
    }

    fn decompose(m: &SpMat<R>, part: Partition, include_bb: bool) -> Result<Self, MatError> {
        if !m.is_square() {
            return Err(MatError::not_square("block decompose", m.shape()))
        }
        if m.nrows() != part.dim() {
            return Err(MatError::DimensionMismatch(format!(
                "block decompose: matrix is {}x{}, partition is over {}",
                m.nrows(), m.ncols(), part.dim()
            )))
        }

        debug!(
            "block decompose: {:?}, nnz: {}, |A|: {}, |B|: {}, bb: {include_bb} ..",
            m.shape(), m.nnz(), part.dim_a(), part.dim_b()
        );

        let Buckets([aa, ab, ba, bb]) = classify(m, &part, include_bb);

        let build = |b: Block, entries: Entries<R>| SpMat::from_stored_entries(b.shape(&part), entries);
        let aa = build(Block::AA, aa);
        let ab = build(Block::AB, ab);
        let ba = build(Block::BA, ba);
        let bb = include_bb.then(|| build(Block::BB, bb));

        trace!(
            "block decompose: nnz AA: {}, AB: {}, BA: {}, BB: {:?}.",
            aa.nnz(), ab.nnz(), ba.nnz(), bb.as_ref().map(|x| x.nnz())
        );

        Ok(Self { part, aa, ab, ba, bb })
    }

    pub fn partition(&self) -> &Partition {
        &self.part
    }

    pub fn aa(&self) -> &SpMat<R> {
        &self.aa
    }

    pub fn ab(&self) -> &SpMat<R> {
        &self.ab
    }

    pub fn ba(&self) -> &SpMat<R> {
        &self.ba
    }

    pub fn bb(&self) -> Option<&SpMat<R>> {
        self.bb.as_ref()
    }

    pub fn has_bb(&self) -> bool {
        self.bb.is_some()
    }

    pub fn block(&self, b: Block) -> Option<&SpMat<R>> {
        match b {
            Block::AA => Some(&self.aa),
            Block::AB => Some(&self.ab),
            Block::BA => Some(&self.ba),
            Block::BB => self.bb.as_ref(),
        }
    }

    pub fn into_blocks(self) -> (SpMat<R>, SpMat<R>, SpMat<R>, Option<SpMat<R>>) {
        (self.aa, self.ab, self.ba, self.bb)
    }

    pub fn split_vec<T>(&self, v: &[T]) -> Result<(Vec<T>, Vec<T>), MatError>
    where T: Clone {
        self.part.split_vec(v)
    }

    pub fn merge_vecs<T>(&self, va: &[T], vb: &[T]) -> Result<Vec<T>, MatError>
    where T: Clone {
        self.part.merge_vecs(va, vb)
    }

    fn require_bb(&self) -> Result<&SpMat<R>, MatError> {
        self.bb.as_ref().ok_or(MatError::MissingBlock(Block::BB))
    }

    /// The original matrix, rebuilt through the inverse index mapping.
    pub fn reassemble(&self) -> Result<SpMat<R>, MatError> {
        let bb = self.require_bb()?;
        let a = self.part.orig_inds_a();
        let b = self.part.orig_inds_b();
        let n = self.part.dim();

        let entries = [
            (&self.aa, a, a),
            (&self.ab, a, b),
            (&self.ba, b, a),
            (bb, b, b),
        ].into_iter().flat_map(|(x, rows, cols)|
            x.iter().map(move |(i, j, v)| (rows[i], cols[j], *v))
        );

        Ok(SpMat::from_stored_entries((n, n), entries))
    }

    /// The blocks laid out as `[AA AB; BA BB]`, i.e. the original matrix
    /// with rows and columns permuted by `Partition::perm()`.
    pub fn permuted(&self) -> Result<SpMat<R>, MatError> {
        let bb = self.require_bb()?;
        Ok(SpMat::combine_blocks([&self.aa, &self.ab, &self.ba, bb]))
    }
}

type Entries<R> = Vec<(usize, usize, R)>;

// one entry list per `Block`, indexed by `Block as usize`.
struct Buckets<R>([Entries<R>; 4]);

impl<R> Buckets<R>
where R: Field {
    fn new() -> Self {
        Self([vec![], vec![], vec![], vec![]])
    }

    #[inline]
    fn push(&mut self, part: &Partition, include_bb: bool, i: usize, j: usize, a: R) {
        let b = Block::of(part.is_in_a(i), part.is_in_a(j));
        if b == Block::BB && !include_bb {
            return
        }
        self.0[b as usize].push((part.new_ind(i), part.new_ind(j), a))
    }

    // keeps the order of `self` before `other`.
    fn merge(mut self, other: Self) -> Self {
        for (x, mut y) in zip(self.0.iter_mut(), other.0) {
            x.append(&mut y);
        }
        self
    }
}

fn classify_s<R>(m: &SpMat<R>, part: &Partition, include_bb: bool) -> Buckets<R>
where R: Field {
    m.iter().fold(Buckets::new(), |mut res, (i, j, a)| {
        res.push(part, include_bb, i, j, *a);
        res
    })
}

cfg_if::cfg_if! {
    if #[cfg(feature = "multithread")] {
        use rayon::prelude::*;

        fn classify<R>(m: &SpMat<R>, part: &Partition, include_bb: bool) -> Buckets<R>
        where R: Field {
            if crate::config::is_multithread_enabled() {
                classify_m(m, part, include_bb)
            } else {
                classify_s(m, part, include_bb)
            }
        }

        // columns are split across the pool, each job fills its own buckets.
        // `reduce` merges them in column order, so the result matches
        // `classify_s` entry for entry.
        fn classify_m<R>(m: &SpMat<R>, part: &Partition, include_bb: bool) -> Buckets<R>
        where R: Field {
            (0 .. m.ncols()).into_par_iter().fold(Buckets::new, |mut res, j| {
                let col = m.inner().col(j);
                for (&i, a) in zip(col.row_indices(), col.values()) {
                    res.push(part, include_bb, i, j, *a);
                }
                res
            }).reduce(Buckets::new, Buckets::merge)
        }
    } else {
        fn classify<R>(m: &SpMat<R>, part: &Partition, include_bb: bool) -> Buckets<R>
        where R: Field {
            classify_s(m, part, include_bb)
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use nalgebra_sparse::{CooMatrix, CscMatrix};
    use rand::rngs::StdRng;
    use super::*;

    fn example() -> SpMat<f64> {
        SpMat::from_entries((4, 4), [
            (0, 0, 5.0),
            (0, 1, 2.0),
            (1, 0, 2.0),
            (1, 1, 9.0),
            (2, 3, 7.0),
        ])
    }

    fn rand_mask<G: Rng>(n: usize, rng: &mut G) -> Vec<bool> {
        (0..n).map(|_| rng.gen_bool(0.5)).collect()
    }

    #[test]
    fn interleaved() {
        let m = example();
        let d = BlockDecomp::full(&m, &[true, false, true, false]).unwrap();

        assert_eq!(d.partition().orig_inds_a(), &[0, 2]);
        assert_eq!(d.partition().orig_inds_b(), &[1, 3]);
        assert_eq!(d.partition().new_inds(), &[0, 0, 1, 1]);

        assert_eq!(d.aa(), &SpMat::from_dense_data((2, 2), [
            5., 0.,
            0., 0.
        ]));
        assert_eq!(d.ab(), &SpMat::from_dense_data((2, 2), [
            2., 0.,
            0., 7.
        ]));
        assert_eq!(d.ba(), &SpMat::from_dense_data((2, 2), [
            2., 0.,
            0., 0.
        ]));
        assert_eq!(d.bb(), Some(&SpMat::from_dense_data((2, 2), [
            9., 0.,
            0., 0.
        ])));
    }

    #[test]
    fn block_shapes() {
        let m = SpMat::<f64>::id(5);
        let d = BlockDecomp::full(&m, &[true, true, false, true, false]).unwrap();

        for b in Block::ALL {
            let x = d.block(b).unwrap();
            assert_eq!(x.shape(), b.shape(d.partition()));
        }
        assert_eq!(d.aa(), &SpMat::id(3));
        assert_eq!(d.bb(), Some(&SpMat::id(2)));
        assert!(d.ab().is_zero());
        assert!(d.ba().is_zero());
    }

    #[test]
    fn free_fn() {
        let m = example();
        let part = Partition::new(4, &[true, false, true, false]).unwrap();
        let d1 = block_decompose(&m, &part, true).unwrap();
        let d2 = BlockDecomp::full(&m, &[true, false, true, false]).unwrap();
        assert_eq!(d1, d2);
        assert_eq!(d1.partition(), &part);
    }

    #[test]
    fn coincident_entries_summed() {
        let m = SpMat::from_entries((3, 3), [
            (0, 2, 1.0),
            (0, 2, 2.5),
            (2, 2, 1.0),
            (1, 0, 4.0),
            (2, 2, 1.0),
        ]);
        let d = BlockDecomp::full(&m, &[true, false, false]).unwrap();

        assert_eq!(d.ab().get(0, 1), Some(&3.5));
        assert_eq!(d.ba().get(0, 0), Some(&4.0));
        assert_eq!(d.bb().unwrap().get(1, 1), Some(&2.0));
        assert_eq!(d.reassemble().unwrap(), m);
    }

    #[test]
    fn explicit_zeros_kept() {
        let mut coo = CooMatrix::new(3, 3);
        coo.push(0, 0, 1.0);
        coo.push(0, 2, 0.0);
        coo.push(2, 1, 0.0);
        coo.push(1, 1, 3.0);
        let m = SpMat::from(CscMatrix::from(&coo));
        assert_eq!(m.nnz(), 4);

        let d = BlockDecomp::full(&m, &[true, false, false]).unwrap();
        let nnz = Block::ALL.iter().map(|&b| d.block(b).unwrap().nnz()).sum::<usize>();
        assert_eq!(nnz, m.nnz());
        assert_eq!(d.ab().get(0, 1), Some(&0.0));
        assert_eq!(d.bb().unwrap().get(1, 0), Some(&0.0));
        assert_eq!(d.reassemble().unwrap(), m);
    }

    #[test]
    fn not_square() {
        let m = SpMat::<f64>::zero((3, 4));
        let e = BlockDecomp::new(&m, &[true; 3], true).unwrap_err();
        assert!(matches!(e, MatError::DimensionMismatch(_)));

        let e = BlockDecomp::new(&m, &[true; 2], true).unwrap_err();
        assert!(matches!(e, MatError::DimensionMismatch(_)));
    }

    #[test]
    fn partition_mismatch() {
        let m = example();
        let part = Partition::new(3, &[true, false, true]).unwrap();
        let e = block_decompose(&m, &part, true).unwrap_err();
        assert!(matches!(e, MatError::DimensionMismatch(_)));

        let e = BlockDecomp::new(&m, &[true, false, true], true).unwrap_err();
        assert!(matches!(e, MatError::SizeMismatch { .. }));
    }

    #[test]
    fn skip_bb() {
        let mut rng = StdRng::seed_from_u64(3);
        let m = SpMat::<f64>::rand((12, 12), 0.4, &mut rng);
        let mask = rand_mask(12, &mut rng);

        let full = BlockDecomp::new(&m, &mask, true).unwrap();
        let part = BlockDecomp::new(&m, &mask, false).unwrap();

        assert!(full.has_bb());
        assert!(!part.has_bb());
        assert_eq!(part.bb(), None);
        assert_eq!(part.block(Block::BB), None);
        assert_eq!(full.aa(), part.aa());
        assert_eq!(full.ab(), part.ab());
        assert_eq!(full.ba(), part.ba());

        assert_eq!(part.reassemble(), Err(MatError::MissingBlock(Block::BB)));
        assert_eq!(part.permuted(), Err(MatError::MissingBlock(Block::BB)));
    }

    #[test]
    fn degenerate() {
        let mut rng = StdRng::seed_from_u64(4);
        let m = SpMat::<f64>::rand((6, 6), 0.5, &mut rng);

        let d = BlockDecomp::full(&m, &[true; 6]).unwrap();
        assert_eq!(d.aa(), &m);
        assert_eq!(d.ab().shape(), (6, 0));
        assert_eq!(d.ba().shape(), (0, 6));
        assert_eq!(d.bb().unwrap().shape(), (0, 0));

        let d = BlockDecomp::full(&m, &[false; 6]).unwrap();
        assert_eq!(d.aa().shape(), (0, 0));
        assert_eq!(d.bb(), Some(&m));

        let v = (0..6).map(|i| i as f64).collect_vec();
        let (va, vb) = d.split_vec(&v).unwrap();
        assert!(va.is_empty());
        assert_eq!(vb, v);
    }

    #[test]
    fn reassemble() {
        let mut rng = StdRng::seed_from_u64(5);
        for n in [1, 4, 15, 40] {
            let m = SpMat::<f64>::rand((n, n), 0.3, &mut rng);
            let mask = rand_mask(n, &mut rng);
            let d = BlockDecomp::full(&m, &mask).unwrap();

            let nnz = Block::ALL.iter().map(|&b| d.block(b).unwrap().nnz()).sum::<usize>();
            assert_eq!(nnz, m.nnz());
            assert_eq!(d.reassemble().unwrap(), m);
        }
    }

    #[test]
    fn permuted() {
        let mut rng = StdRng::seed_from_u64(6);
        let m = SpMat::<f64>::rand((10, 10), 0.4, &mut rng);
        let mask = rand_mask(10, &mut rng);
        let d = BlockDecomp::full(&m, &mask).unwrap();

        let p = d.partition().perm();
        assert_eq!(d.permuted().unwrap(), m.permute(p.view(), p.view()));
    }

    #[test]
    fn apply_blocks() {
        // (m x)_A = AA x_A + AB x_B,  (m x)_B = BA x_A + BB x_B
        let mut rng = StdRng::seed_from_u64(7);
        let m = SpMat::<f64>::rand((9, 9), 0.5, &mut rng);
        let mask = rand_mask(9, &mut rng);
        let d = BlockDecomp::full(&m, &mask).unwrap();

        let x = (0..9).map(|_| rng.gen_range(-4..=4) as f64).collect_vec();
        let (xa, xb) = d.split_vec(&x).unwrap();
        let (ya, yb) = d.split_vec(&m.mul_vec(&x).unwrap()).unwrap();

        let add = |u: Vec<f64>, v: Vec<f64>| zip(u, v).map(|(a, b)| a + b).collect_vec();
        let bb = d.bb().unwrap();

        assert_eq!(add(d.aa().mul_vec(&xa).unwrap(), d.ab().mul_vec(&xb).unwrap()), ya);
        assert_eq!(add(d.ba().mul_vec(&xa).unwrap(), bb.mul_vec(&xb).unwrap()), yb);
    }

    #[test]
    fn complex_entries() {
        use blk::Complex;
        let i = Complex::new(0.0, 1.0);
        let m = SpMat::from_entries((2, 2), [
            (0, 0, Complex::new(1.0, 0.0)),
            (0, 1, i),
            (1, 0, -i),
        ]);
        let d = BlockDecomp::full(&m, &[false, true]).unwrap();
        assert_eq!(d.ba().get(0, 0), Some(&i));
        assert_eq!(d.ab().get(0, 0), Some(&-i));
        assert_eq!(d.bb().unwrap().get(0, 0), Some(&Complex::new(1.0, 0.0)));
        assert!(d.aa().is_zero());
    }

    #[test]
    fn into_blocks() {
        let d = BlockDecomp::new(&example(), &[true, false, true, false], false).unwrap();
        let (aa, ab, ba, bb) = d.into_blocks();
        assert_eq!(aa.nnz() + ab.nnz() + ba.nnz(), 4);
        assert!(bb.is_none());
    }

    #[test]
    #[cfg(feature = "multithread")]
    fn multithread_matches() {
        let mut rng = StdRng::seed_from_u64(8);
        for include_bb in [true, false] {
            let m = SpMat::<f64>::rand((60, 60), 0.2, &mut rng);
            let mask = rand_mask(60, &mut rng);
            let part = Partition::new(60, &mask).unwrap();

            let Buckets(s) = classify_s(&m, &part, include_bb);
            let Buckets(p) = classify_m(&m, &part, include_bb);
            assert_eq!(s, p);
        }
    }
}
