use serde::{Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

/// A race or series points value with exactly one decimal place.
///
/// Stored as an integer count of tenths so that equality, ordering and
/// summing never drift. Every constructor rounds half-to-even at the first
/// decimal, so a finalized value always equals its own rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Points(i64);

impl Points {
    pub const ZERO: Points = Points(0);

    pub const fn from_tenths(tenths: i64) -> Self {
        Points(tenths)
    }

    /// Points for a single (untied) finishing place: 1st = 1.0, 2nd = 2.0, ...
    pub fn from_place(place: usize) -> Self {
        Points(place as i64 * 10)
    }

    /// Average of the places `first..first + count` (1-based), as awarded to
    /// `count` boats tied from place `first`.
    pub fn shared_place(first: usize, count: usize) -> Self {
        let last = first + count.max(1) - 1;
        // (first + last) / 2 in tenths is always exact: x.0 or x.5
        Points((first + last) as i64 * 5)
    }

    /// Round a float to one decimal place, half-to-even on its exact binary value.
    ///
    /// Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // Fixed-precision formatting prints the exact decimal expansion, which
        // keeps binary values like 0.15 (really 0.1499...) on the right side.
        Self::parse_decimal(&format!("{:.30}", value))
    }

    /// Parse a plain decimal string ("2", "2.35", "-0.5") rounding half-to-even
    /// at one decimal place. Exponents and other notations are rejected.
    pub fn parse_decimal(s: &str) -> Option<Self> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };
        let mut frac = frac_part.bytes().map(|b| i64::from(b - b'0'));
        let first = frac.next().unwrap_or(0);
        let mut tenths = whole.checked_mul(10)?.checked_add(first)?;

        let rest: Vec<i64> = frac.collect();
        let round_up = match rest.first() {
            None => false,
            Some(&d) if d > 5 => true,
            Some(&d) if d < 5 => false,
            Some(_) => {
                if rest.iter().skip(1).any(|&d| d != 0) {
                    true
                } else {
                    tenths % 2 == 1
                }
            }
        };
        if round_up {
            tenths = tenths.checked_add(1)?;
        }

        Some(Points(if negative { -tenths } else { tenths }))
    }

    /// Mean of `values` rounded half-to-even to one decimal place.
    /// Returns `None` for an empty slice.
    pub fn mean(values: &[Points]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let total: i64 = values.iter().map(|p| p.0).sum();
        Some(Points(div_round_half_even(total, values.len() as i64)))
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 10.0
    }
}

fn div_round_half_even(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);
    match (2 * remainder).cmp(&denominator) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => quotient + (quotient & 1),
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{}", sign, abs / 10, abs % 10)
    }
}

impl Add for Points {
    type Output = Points;

    fn add(self, rhs: Points) -> Points {
        Points(self.0 + rhs.0)
    }
}

impl Mul<usize> for Points {
    type Output = Points;

    fn mul(self, rhs: usize) -> Points {
        Points(self.0 * rhs as i64)
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Points>>(iter: I) -> Points {
        iter.fold(Points::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Points> for Points {
    fn sum<I: Iterator<Item = &'a Points>>(iter: I) -> Points {
        iter.copied().sum()
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}
