pub use crate::MatTrait;

mod sp_mat;
mod partition;
mod block;
mod check;
mod complex;

pub use sp_mat::*;
pub use partition::*;
pub use block::*;
pub use check::*;
pub use complex::*;
