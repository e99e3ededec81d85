mod base;
mod error;

pub use base::*;
pub use error::*;

pub mod config;
pub mod sparse;
