//! Unevaluated double-double arithmetic for the deepest zoom tier.
//!
//! A value is the exact sum `hi + lo` of two f64s with `|lo| <= 0.5 ulp(hi)`,
//! giving roughly 106 bits of significand. Addition and multiplication use
//! the classic error-free transforms (Knuth two-sum, Dekker split product),
//! so results are deterministic across platforms without relying on FMA.

use crate::numeric::Real;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

/// Double-double float: `hi` carries the leading value, `lo` the trailing
/// rounding error of `hi`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DoubleDouble {
    hi: f64,
    lo: f64,
}

/// Knuth two-sum: s + e == a + b exactly.
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bv = s - a;
    let e = (a - (s - bv)) + (b - bv);
    (s, e)
}

/// Dekker split product: p + e == a * b exactly.
#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    const SPLIT: f64 = 134_217_729.0; // 2^27 + 1

    let a_c = a * SPLIT;
    let a_hi = a_c - (a_c - a);
    let a_lo = a - a_hi;

    let b_c = b * SPLIT;
    let b_hi = b_c - (b_c - b);
    let b_lo = b - b_hi;

    let p = a * b;
    let e = ((a_hi * b_hi - p) + a_hi * b_lo + a_lo * b_hi) + a_lo * b_lo;
    (p, e)
}

impl DoubleDouble {
    pub const ZERO: Self = Self { hi: 0.0, lo: 0.0 };

    #[inline]
    pub fn new(hi: f64, lo: f64) -> Self {
        Self::renorm(hi, lo)
    }

    /// Re-establish |lo| <= 0.5 ulp(hi).
    #[inline]
    fn renorm(hi: f64, lo: f64) -> Self {
        let (s, e) = two_sum(hi, lo);
        Self { hi: s, lo: e }
    }

    #[inline]
    pub fn hi(self) -> f64 {
        self.hi
    }

    #[inline]
    pub fn lo(self) -> f64 {
        self.lo
    }
}

impl Add for DoubleDouble {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let (s1, e1) = two_sum(self.hi, rhs.hi);
        let (s2, e2) = two_sum(self.lo, rhs.lo);
        let lo = e1 + s2;
        let (hi, mut lo) = two_sum(s1, lo);
        lo += e2;
        Self::renorm(hi, lo)
    }
}

impl Sub for DoubleDouble {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul for DoubleDouble {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let (p, mut e) = two_prod(self.hi, rhs.hi);
        e += self.hi * rhs.lo + self.lo * rhs.hi;
        Self::renorm(p, e)
    }
}

impl Neg for DoubleDouble {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl PartialOrd for DoubleDouble {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.hi.partial_cmp(&other.hi) {
            Some(Ordering::Equal) => self.lo.partial_cmp(&other.lo),
            ord => ord,
        }
    }
}

impl From<f64> for DoubleDouble {
    #[inline]
    fn from(v: f64) -> Self {
        Self { hi: v, lo: 0.0 }
    }
}

impl Real for DoubleDouble {
    #[inline]
    fn from_f64(v: f64) -> Self {
        Self::from(v)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self.hi + self.lo
    }
}
