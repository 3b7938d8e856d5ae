//! The arithmetic capability the graph algorithms are written against.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A field element usable as a transition rate and matrix entry.
///
/// Implemented for [`crate::Expr`] (closed-form symbolic results), for
/// [`BigRational`] (exact numeric results) and for `f64`.
pub trait Scalar:
    Clone
    + PartialEq
    + Debug
    + Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn zero() -> Self;

    fn one() -> Self;

    fn from_i64(value: i64) -> Self;

    /// True when the value is identically zero.
    ///
    /// Floating point values compare against `0.0` exactly; a numerically
    /// singular `f64` matrix is caught by [`is_finite`](Scalar::is_finite)
    /// on the result instead.
    fn is_zero(&self) -> bool;

    /// False for values that overflowed or are not a number.
    fn is_finite(&self) -> bool {
        true
    }

    /// `self / rhs`, or `None` when `rhs` is identically zero.
    fn checked_div(&self, rhs: &Self) -> Option<Self> {
        if rhs.is_zero() {
            None
        } else {
            Some(self.clone() / rhs.clone())
        }
    }

    /// Canonical, reduced form of the value.
    fn simplify(&self) -> Self {
        self.clone()
    }
}

impl Scalar for f64 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn from_i64(value: i64) -> Self {
        value as f64
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl Scalar for BigRational {
    fn zero() -> Self {
        <BigRational as Zero>::zero()
    }

    fn one() -> Self {
        <BigRational as One>::one()
    }

    fn from_i64(value: i64) -> Self {
        BigRational::from_integer(BigInt::from(value))
    }

    fn is_zero(&self) -> bool {
        <BigRational as Zero>::is_zero(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halve<T: Scalar>(value: T) -> Option<T> {
        value.checked_div(&T::from_i64(2))
    }

    #[test]
    fn checked_div_rejects_zero() {
        assert_eq!(<f64 as Scalar>::one().checked_div(&0.0), None);
        assert_eq!(halve(3.0_f64), Some(1.5));
    }

    #[test]
    fn only_floats_can_overflow() {
        assert!(Scalar::is_finite(&1e308_f64));
        assert!(!Scalar::is_finite(&(1e308_f64 * 10.0)));
        assert!(!Scalar::is_finite(&f64::NAN));
        assert!(Scalar::is_finite(&BigRational::from_i64(7)));
    }

    #[test]
    fn rational_scalar_is_exact() {
        let third = <BigRational as Scalar>::one()
            .checked_div(&BigRational::from_i64(3))
            .unwrap();
        let sum = third.clone() + third.clone() + third;
        assert_eq!(sum, <BigRational as Scalar>::one());
        assert!(Scalar::is_zero(&(sum - <BigRational as Scalar>::one())));
    }
}
