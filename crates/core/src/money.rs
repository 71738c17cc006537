//! Exact monetary amounts.
//!
//! Amounts are arbitrary-precision rationals. Nothing in this module rounds
//! except the explicit presentation helpers (`to_decimal_string`,
//! `to_rounded_decimal`), which exist for display edges only.

use core::fmt;
use core::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("denominator must not be zero")]
    ZeroDenominator,

    #[error("cannot parse '{0}' as an exact amount")]
    Parse(String),
}

/// An immutable, exact rational amount.
///
/// Equality is exact rational comparison: `1/2 == 2/4 == 0.5`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(BigRational);

impl Money {
    pub fn new(numer: i64, denom: i64) -> Result<Self, MoneyError> {
        if denom == 0 {
            return Err(MoneyError::ZeroDenominator);
        }
        Ok(Self(BigRational::new(BigInt::from(numer), BigInt::from(denom))))
    }

    pub fn from_integer(value: i64) -> Self {
        Self(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn from_ratio(amount: BigRational) -> Self {
        Self(amount)
    }

    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn amount(&self) -> &BigRational {
        &self.0
    }

    pub fn into_ratio(self) -> BigRational {
        self.0
    }

    /// Numerator of the reduced fraction.
    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    /// Denominator of the reduced fraction (always positive).
    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    /// Reduced numerator/denominator as `i64`, if both fit.
    pub fn to_i64_parts(&self) -> Option<(i64, i64)> {
        Some((self.numer().to_i64()?, self.denom().to_i64()?))
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn add(&self, other: &Money) -> Money {
        Money(&self.0 + &other.0)
    }

    pub fn subtract(&self, other: &Money) -> Money {
        Money(&self.0 - &other.0)
    }

    pub fn multiply(&self, ratio: &BigRational) -> Money {
        Money(&self.0 * ratio)
    }

    /// Render rounded to `scale` fractional digits (half away from zero).
    pub fn to_decimal_string(&self, scale: u32) -> String {
        to_rounded_decimal(&self.0, scale)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ratio(f, &self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_rational(s).map(Money)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Exact text form of a rational: `"7"` or `"1999/100"`.
pub fn format_rational(value: &BigRational) -> String {
    struct Exact<'a>(&'a BigRational);
    impl fmt::Display for Exact<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_ratio(f, self.0)
        }
    }
    Exact(value).to_string()
}

fn write_ratio(f: &mut fmt::Formatter<'_>, value: &BigRational) -> fmt::Result {
    if value.denom().is_one() {
        write!(f, "{}", value.numer())
    } else {
        write!(f, "{}/{}", value.numer(), value.denom())
    }
}

/// Parse `"n"`, `"n/d"` or a plain decimal such as `"19.99"` exactly.
pub fn parse_rational(input: &str) -> Result<BigRational, MoneyError> {
    let s = input.trim();
    let parse_int = |part: &str| {
        part.parse::<BigInt>()
            .map_err(|_| MoneyError::Parse(input.to_string()))
    };

    if let Some((numer, denom)) = s.split_once('/') {
        let numer = parse_int(numer.trim())?;
        let denom = parse_int(denom.trim())?;
        if denom.is_zero() {
            return Err(MoneyError::ZeroDenominator);
        }
        return Ok(BigRational::new(numer, denom));
    }

    if let Some((whole, frac)) = s.split_once('.') {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyError::Parse(input.to_string()));
        }
        let negative = whole.starts_with('-');
        let whole = if whole.is_empty() || whole == "-" || whole == "+" {
            BigInt::zero()
        } else {
            parse_int(whole)?
        };
        let scale = BigInt::from(10u32).pow(frac.len() as u32);
        let frac = parse_int(frac)?;
        let magnitude = whole.abs() * &scale + frac;
        let numer = if negative { -magnitude } else { magnitude };
        return Ok(BigRational::new(numer, scale));
    }

    Ok(BigRational::from_integer(parse_int(s)?))
}

/// Exact decimal text if the value terminates in base 10 (`1/8` -> `"0.125"`).
pub fn to_exact_decimal(value: &BigRational) -> Option<String> {
    let mut denom = value.denom().clone();
    let two = BigInt::from(2u32);
    let five = BigInt::from(5u32);
    let (mut twos, mut fives) = (0u32, 0u32);
    while (&denom % &two).is_zero() {
        denom /= &two;
        twos += 1;
    }
    while (&denom % &five).is_zero() {
        denom /= &five;
        fives += 1;
    }
    if !denom.is_one() {
        return None;
    }
    let scale = twos.max(fives);
    let scaled = value * BigRational::from_integer(BigInt::from(10u32).pow(scale));
    Some(format_scaled(&scaled.to_integer(), scale))
}

/// Decimal text rounded to `scale` digits, half away from zero.
pub fn to_rounded_decimal(value: &BigRational, scale: u32) -> String {
    let factor = BigRational::from_integer(BigInt::from(10u32).pow(scale));
    let scaled = (value * factor).round();
    format_scaled(&scaled.to_integer(), scale)
}

fn format_scaled(scaled: &BigInt, scale: u32) -> String {
    let digits = scaled.abs().to_string();
    let sign = if scaled.is_negative() { "-" } else { "" };
    if scale == 0 {
        return format!("{sign}{digits}");
    }
    let scale = scale as usize;
    let padded = format!("{digits:0>width$}", width = scale + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    format!("{sign}{int_part}.{frac_part}")
}
