use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// Fixed-point one: fixed values carry 24 decimal places.
pub const FIXED1: u128 = 1_000_000_000_000_000_000_000_000;

/// An unsigned rational `numerator / denominator`.
///
/// Ordering and equality are exact: two fractions are compared by
/// cross-multiplying into 256 bits, so `1/2` and `2/4` compare equal and no
/// rounding ever changes an ordering decision.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawFraction")]
pub struct Fraction {
    numerator: u128,
    denominator: u128,
}

/// Unchecked wire form of a [`Fraction`].
#[derive(Deserialize)]
struct RawFraction {
    numerator: u128,
    denominator: u128,
}

impl TryFrom<RawFraction> for Fraction {
    type Error = RegistryError;

    fn try_from(raw: RawFraction) -> Result<Self> {
        Fraction::new(raw.numerator, raw.denominator)
    }
}

impl Fraction {
    /// Creates `numerator / denominator`.
    pub fn new(numerator: u128, denominator: u128) -> Result<Self> {
        if denominator == 0 {
            return Err(RegistryError::ZeroDenominator);
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Interprets `fixed` as a 24-decimal fixed-point number.
    pub fn from_fixed(fixed: u128) -> Self {
        Self {
            numerator: fixed,
            denominator: FIXED1,
        }
    }

    /// A whole number.
    pub fn from_integer(value: u64) -> Self {
        Self {
            numerator: value as u128,
            denominator: 1,
        }
    }

    /// Numerator.
    pub fn numerator(&self) -> u128 {
        self.numerator
    }

    /// Denominator, never zero.
    pub fn denominator(&self) -> u128 {
        self.denominator
    }

    /// Converts to a 24-decimal fixed-point number, truncating.
    ///
    /// Returns `None` when the result does not fit in a `u128`.
    pub fn to_fixed(&self) -> Option<u128> {
        let (high, low) = widening_mul(self.numerator, FIXED1);
        div_wide(high, low, self.denominator)
    }
}

/// `(high << 128 | low) / divisor`, or `None` if the quotient overflows.
fn div_wide(high: u128, low: u128, divisor: u128) -> Option<u128> {
    if high >= divisor {
        return None;
    }
    let mut rem = high;
    let mut quot = 0u128;
    for bit in (0..128).rev() {
        // The remainder may briefly need 129 bits.
        let carry = rem >> 127;
        rem = (rem << 1) | ((low >> bit) & 1);
        quot <<= 1;
        if carry == 1 || rem >= divisor {
            rem = rem.wrapping_sub(divisor);
            quot |= 1;
        }
    }
    Some(quot)
}

/// Full 256-bit product of two `u128` values as `(high, low)`.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);
    let lo_lo = a_lo * b_lo;
    let hi_lo = a_hi * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_hi = a_hi * b_hi;
    let cross = (lo_lo >> 64) + (hi_lo & MASK) + (lo_hi & MASK);
    let low = (lo_lo & MASK) | (cross << 64);
    let high = hi_hi + (hi_lo >> 64) + (lo_hi >> 64) + (cross >> 64);
    (high, low)
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        widening_mul(self.numerator, other.denominator)
            .cmp(&widening_mul(other.numerator, self.denominator))
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fraction {}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
