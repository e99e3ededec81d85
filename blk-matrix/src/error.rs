use thiserror::Error;
use crate::sparse::Block;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatError {
    #[error("size mismatch for {what}: expected {expected}, found {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("index {index} is out of range for dimension {dim}")]
    IndexOutOfRange { index: usize, dim: usize },

    #[error("invalid partition: {0}")]
    InvalidPartition(String),

    #[error("block {0} was not built")]
    MissingBlock(Block),

    // for vectors, `col` is always 0.
    #[error("non-finite entry at ({row}, {col})")]
    NotFinite { row: usize, col: usize },

    #[error("matrix is not symmetric: |a({row}, {col}) - a({col}, {row})| = {diff:e} > {eps:e}")]
    NotSymmetric {
        row: usize,
        col: usize,
        diff: f64,
        eps: f64,
    },

    #[error("matrix is not hermitian: |a({row}, {col}) - conj(a({col}, {row}))| = {diff:e} > {eps:e}")]
    NotHermitian {
        row: usize,
        col: usize,
        diff: f64,
        eps: f64,
    },
}

impl MatError { 
    pub(crate) fn size_mismatch(what: &'static str, expected: usize, actual: usize) -> Self { 
        Self::SizeMismatch { what, expected, actual }
    }

    pub(crate) fn not_square(op: &str, shape: (usize, usize)) -> Self { 
        Self::DimensionMismatch(format!("{op}: expected a square matrix, found {}x{}", shape.0, shape.1))
    }

    pub fn is_validation(&self) -> bool { 
        matches!(self, 
            Self::NotFinite { .. } | 
            Self::NotSymmetric { .. } | 
            Self::NotHermitian { .. }
        )
    }
}
