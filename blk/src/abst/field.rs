use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_complex::Complex;
use num_traits::{One, Zero};
use crate::ElemBase;

pub trait FieldOps<T = Self>: 
    Sized + 
    Add<T, Output = T> + 
    Sub<T, Output = T> + 
    Mul<T, Output = T> + 
    Neg<Output = T>
{}

impl<T> FieldOps for T where T: 
    Add<T, Output = T> + 
    Sub<T, Output = T> + 
    Mul<T, Output = T> + 
    Neg<Output = T>
{}

/// Scalar type of a sparse linear system: real or complex floats.
pub trait Field: 
    ElemBase + 
    FieldOps + 
    AddAssign + 
    SubAssign + 
    MulAssign + 
    Zero + 
    One
{
    /// Complex conjugate. Identity for real types.
    fn conj(&self) -> Self;

    /// Modulus as `f64`.
    fn abs_val(&self) -> f64;

    fn is_finite(&self) -> bool;

    fn from_f64(val: f64) -> Self;
}

macro_rules! impl_real {
    ($t:ty) => {
        impl Field for $t {
            #[inline]
            fn conj(&self) -> Self {
                *self
            }

            #[inline]
            fn abs_val(&self) -> f64 {
                <$t>::abs(*self) as f64
            }

            #[inline]
            fn is_finite(&self) -> bool {
                <$t>::is_finite(*self)
            }

            #[inline]
            fn from_f64(val: f64) -> Self {
                val as $t
            }
        }
    };
}

macro_rules! impl_complex {
    ($t:ty) => {
        impl Field for Complex<$t> {
            #[inline]
            fn conj(&self) -> Self {
                Complex::<$t>::conj(self)
            }

            #[inline]
            fn abs_val(&self) -> f64 {
                Complex::<$t>::norm(*self) as f64
            }

            #[inline]
            fn is_finite(&self) -> bool {
                Complex::<$t>::is_finite(*self)
            }

            #[inline]
            fn from_f64(val: f64) -> Self {
                Complex::new(val as $t, 0.0)
            }
        }
    };
}

impl_real!(f32);
impl_real!(f64);
impl_complex!(f32);
impl_complex!(f64);
