//! Fixed-point price representation.
//!
//! Uses i64 with 4 implied decimal places (scale = 10_000). The default tick
//! of 0.01 is raw 100, so every limit price is an exact integer multiple of
//! the tick and mid-prices land on the half-tick grid at worst. Floats only
//! appear at decision and reporting boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Scale factor: 4 decimal places
pub const PRICE_DECIMALS: u8 = 4;
pub const PRICE_SCALE: i64 = 10_000;

/// Fixed-point price with 4 decimal places
///
/// Example: 100.05 is stored as 1_000_500.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);
    pub const DECIMALS: u8 = PRICE_DECIMALS;
    pub const SCALE: i64 = PRICE_SCALE;

    /// Create from raw scaled value
    #[inline(always)]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Create from a whole number of currency units
    #[inline(always)]
    pub const fn from_int(value: i64) -> Self {
        Self(value * PRICE_SCALE)
    }

    /// Get the raw scaled value
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

    /// Convert to f64 (decision/report boundaries only)
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }

    /// Create from f64, rounded to the nearest representable value
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        Self((value * PRICE_SCALE as f64).round() as i64)
    }

    /// Round to the tick grid, ties rounding down (half-down)
    ///
    /// 99.995 with a 0.01 tick becomes 99.99, while 99.996 becomes 100.00.
    pub fn round_to_tick(self, tick: Price) -> Price {
        if tick.0 <= 0 {
            return self;
        }
        let rem = self.0.rem_euclid(tick.0);
        let down = self.0 - rem;
        if rem * 2 > tick.0 {
            Price(down + tick.0)
        } else {
            Price(down)
        }
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Midpoint of two prices (rounds toward zero on the raw grid)
    #[inline]
    pub fn midpoint(self, other: Price) -> Price {
        Price((self.0 + other.0) / 2)
    }
}

impl Add for Price {
    type Output = Price;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Price(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Price;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Price(self.0 - rhs.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_f64())
    }
}
