//! Whole-share quantity representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A share count. Always a whole number; resting residuals are kept
/// strictly positive by the book.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);
    pub const ONE: Quantity = Quantity(1);

    #[inline(always)]
    pub const fn new(shares: i64) -> Self {
        Self(shares)
    }

    #[inline(always)]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline(always)]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub fn min(self, other: Quantity) -> Quantity {
        Quantity(self.0.min(other.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0).max(0))
    }

    /// Halve, rounding down
    #[inline]
    pub fn half(self) -> Quantity {
        Quantity(self.0 / 2)
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64
    }
}

impl Add for Quantity {
    type Output = Quantity;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Quantity(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Quantity(self.0 - rhs.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        assert_eq!(
            Quantity::new(5).saturating_sub(Quantity::new(9)),
            Quantity::ZERO
        );
    }

    #[test]
    fn test_min_and_half() {
        assert_eq!(Quantity::new(10).min(Quantity::new(7)), Quantity::new(7));
        assert_eq!(Quantity::new(9).half(), Quantity::new(4));
    }
}
