use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Basis points in one hundred percent.
const FULL_SCALE_BP: i128 = 10_000;

/// A signed monetary amount held as an integer number of cents.
///
/// All stake, profit, and balance arithmetic in the journal happens on
/// this type. Binary floating point never enters a computation; values
/// that arrive as floats (e.g. from a TOML file) are rounded to the
/// nearest cent once, at the boundary.
///
/// Arithmetic saturates at the bounds of `i64` cents, so balances built
/// from untrusted records clamp instead of wrapping.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    /// Create an amount from a raw number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create an amount from whole currency units.
    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(100))
    }

    /// The raw number of cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Parse a decimal string with at most two fractional digits.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        parse_hundredths(input).map(Self)
    }

    /// Round a floating-point amount to the nearest cent.
    pub fn from_f64(value: f64) -> Result<Self, TypeError> {
        hundredths_from_f64(value).map(Self)
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money(")?;
        write_hundredths(f, self.0)?;
        write!(f, ")")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hundredths(f, self.0)
    }
}

impl FromStr for Money {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = DecimalRepr::deserialize(deserializer)?;
        repr.into_hundredths()
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// A payout ratio held as basis points (hundredths of a percent).
///
/// `80` percent is `Percent::from_bp(8000)`; `87.5` percent is `8750`.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(u32);

impl Percent {
    pub const ZERO: Self = Self(0);
    pub const HUNDRED: Self = Self(10_000);

    pub const fn from_bp(bp: u32) -> Self {
        Self(bp)
    }

    /// Whole percent, e.g. `Percent::from_whole(80)`.
    pub const fn from_whole(percent: u32) -> Self {
        Self(percent * 100)
    }

    pub const fn bp(self) -> u32 {
        self.0
    }

    /// Parse a non-negative decimal percentage with at most two fractional digits.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        hundredths_to_percent(parse_hundredths(input)?, input)
    }

    pub fn from_f64(value: f64) -> Result<Self, TypeError> {
        hundredths_to_percent(hundredths_from_f64(value)?, &value.to_string())
    }

    /// Whether this is an acceptable payout: within `(0, 100]`.
    pub fn is_valid_payout(self) -> bool {
        self.0 > 0 && self.0 <= Self::HUNDRED.0
    }
}

impl fmt::Debug for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Percent(")?;
        write_hundredths(f, i64::from(self.0))?;
        write!(f, "%)")
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hundredths(f, i64::from(self.0))?;
        write!(f, "%")
    }
}

impl FromStr for Percent {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim().trim_end_matches('%'))
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&HundredthsDisplay(i64::from(self.0)))
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = DecimalRepr::deserialize(deserializer)?;
        let raw = repr.describe();
        repr.into_hundredths()
            .and_then(|h| hundredths_to_percent(h, &raw))
            .map_err(serde::de::Error::custom)
    }
}

/// Profit a level pays on a win: `round2(entry × payout / 100)`.
///
/// Computed exactly in `i128` as `cents × bp / 10_000`, rounding half away
/// from zero. Every component that needs an expected profit calls this.
pub fn expected_profit(entry: Money, payout: Percent) -> Money {
    let product = i128::from(entry.0) * i128::from(payout.0);
    let quotient = product / FULL_SCALE_BP;
    let remainder = product % FULL_SCALE_BP;
    let rounded = if remainder.abs() * 2 >= FULL_SCALE_BP {
        quotient + product.signum()
    } else {
        quotient
    };
    let cents = i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN });
    Money(cents)
}

// ---------------------------------------------------------------------------
// Fixed-point helpers shared by Money and Percent
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalRepr {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl DecimalRepr {
    fn into_hundredths(self) -> Result<i64, TypeError> {
        match self {
            Self::Text(text) => parse_hundredths(&text),
            Self::Integer(units) => units
                .checked_mul(100)
                .ok_or_else(|| TypeError::OutOfRange(units.to_string())),
            Self::Float(value) => hundredths_from_f64(value),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Integer(units) => units.to_string(),
            Self::Float(value) => value.to_string(),
        }
    }
}

fn parse_hundredths(input: &str) -> Result<i64, TypeError> {
    let invalid = || TypeError::InvalidDecimal(input.to_string());
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > 2 {
        return Err(TypeError::TooPrecise(input.to_string()));
    }

    let whole: i64 = whole
        .parse()
        .map_err(|_| TypeError::OutOfRange(input.to_string()))?;
    let frac_value = frac
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(2)
        .fold(0i64, |acc, b| acc * 10 + i64::from(b - b'0'));

    let magnitude = whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(frac_value))
        .ok_or_else(|| TypeError::OutOfRange(input.to_string()))?;
    Ok(if negative { -magnitude } else { magnitude })
}

fn hundredths_from_f64(value: f64) -> Result<i64, TypeError> {
    if !value.is_finite() {
        return Err(TypeError::InvalidDecimal(value.to_string()));
    }
    // f64::round rounds half away from zero.
    let scaled = (value * 100.0).round();
    if scaled.abs() >= i64::MAX as f64 {
        return Err(TypeError::OutOfRange(value.to_string()));
    }
    Ok(scaled as i64)
}

fn hundredths_to_percent(hundredths: i64, raw: &str) -> Result<Percent, TypeError> {
    if hundredths < 0 {
        return Err(TypeError::NegativePercent(raw.to_string()));
    }
    u32::try_from(hundredths)
        .map(Percent)
        .map_err(|_| TypeError::OutOfRange(raw.to_string()))
}

struct HundredthsDisplay(i64);

impl fmt::Display for HundredthsDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hundredths(f, self.0)
    }
}

fn write_hundredths(f: &mut fmt::Formatter<'_>, value: i64) -> fmt::Result {
    let sign = if value < 0 { "-" } else { "" };
    let magnitude = value.unsigned_abs();
    write!(f, "{sign}{}.{:02}", magnitude / 100, magnitude % 100)
}
