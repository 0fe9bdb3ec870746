//! Numeric abstraction for the escape kernel.
//!
//! The kernel iterates in a tier-selected type (`f32`, `f64`, or
//! [`DoubleDouble`](crate::DoubleDouble)); only the hot loop runs in the
//! generic type. Smoothing and distance math happen in f64 after escape, as
//! the escaped values always fit comfortably in double range.

use std::ops::{Add, Mul, Neg, Sub};

/// Arithmetic required of a kernel iteration type.
pub trait Real:
    Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;

    fn zero() -> Self {
        Self::from_f64(0.0)
    }

    fn one() -> Self {
        Self::from_f64(1.0)
    }
}

impl Real for f32 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Real for f64 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}
