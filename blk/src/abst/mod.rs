mod elem;
mod field;

pub use elem::*;
pub use field::*;
