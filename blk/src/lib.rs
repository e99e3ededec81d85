mod abst;

pub use abst::*;
pub use num_complex::Complex;

pub mod util;
