//! Exact rational money.

use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use thiserror::Error;

/// Errors raised while constructing or exporting [`Money`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("denominator cannot be zero")]
    ZeroDenominator,

    #[error("invalid decimal format: {0}")]
    InvalidDecimal(String),

    /// The value cannot be represented as a pair of 64-bit integers.
    #[error("amount {0} does not fit in 64-bit numerator/denominator")]
    Overflow(String),
}

/// A monetary amount held as an exact rational number.
///
/// The value is always kept in lowest terms with a positive denominator.
/// All arithmetic returns new values and never goes through floating point.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(BigRational);

impl Money {
    /// Builds `numerator / denominator`, e.g. `from_fraction(1999, 100)` is 19.99.
    pub fn from_fraction(numerator: i64, denominator: i64) -> Result<Self, MoneyError> {
        if denominator == 0 {
            return Err(MoneyError::ZeroDenominator);
        }
        Ok(Self(BigRational::new(
            BigInt::from(numerator),
            BigInt::from(denominator),
        )))
    }

    /// Wraps an existing rational.
    pub fn from_ratio(value: BigRational) -> Self {
        Self(value)
    }

    /// Parses a decimal (`"19.99"`) or fraction (`"1999/100"`) string.
    pub fn from_decimal(s: &str) -> Result<Self, MoneyError> {
        parse_rational(s).map(Self)
    }

    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    /// Multiplies by a bare ratio, e.g. a discount fraction.
    pub fn scale(&self, factor: &BigRational) -> Money {
        Money(&self.0 * factor)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn numerator(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denominator(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn as_ratio(&self) -> &BigRational {
        &self.0
    }

    /// Returns `(numerator, denominator)` in the persisted 64-bit form.
    pub fn to_i64_parts(&self) -> Result<(i64, i64), MoneyError> {
        match (self.0.numer().to_i64(), self.0.denom().to_i64()) {
            (Some(n), Some(d)) => Ok((n, d)),
            _ => Err(MoneyError::Overflow(self.0.to_string())),
        }
    }

    /// Renders the amount with exactly `precision` fractional digits,
    /// rounding half away from zero.
    pub fn to_decimal_string(&self, precision: usize) -> String {
        format_decimal(&self.0, precision)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string(2))
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

impl Add for &Money {
    type Output = Money;

    fn add(self, rhs: &Money) -> Money {
        Money(&self.0 + &rhs.0)
    }
}

impl Sub for &Money {
    type Output = Money;

    fn sub(self, rhs: &Money) -> Money {
        Money(&self.0 - &rhs.0)
    }
}

impl Mul for &Money {
    type Output = Money;

    fn mul(self, rhs: &Money) -> Money {
        Money(&self.0 * &rhs.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Mul for Money {
    type Output = Money;

    fn mul(self, rhs: Money) -> Money {
        Money(self.0 * rhs.0)
    }
}

/// Parses `"a/b"`, `"-12"`, `"19.99"`, `".5"` or `"1.5e-3"` into an exact
/// rational.
pub fn parse_rational(input: &str) -> Result<BigRational, MoneyError> {
    let invalid = || MoneyError::InvalidDecimal(input.to_string());
    let s = input.trim();

    if let Some((numer, denom)) = s.split_once('/') {
        let numer: BigInt = numer.trim().parse().map_err(|_| invalid())?;
        let denom: BigInt = denom.trim().parse().map_err(|_| invalid())?;
        if denom.is_zero() {
            return Err(MoneyError::ZeroDenominator);
        }
        return Ok(BigRational::new(numer, denom));
    }

    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => {
            let exponent: i64 = exponent.parse().map_err(|_| invalid())?;
            (mantissa, exponent)
        }
        None => (unsigned, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(invalid());
    }

    let digits = format!("{whole}{fraction}");
    let numer: BigInt = digits.parse().map_err(|_| invalid())?;
    let fraction_len = i64::try_from(fraction.len()).map_err(|_| invalid())?;
    let scale = exponent.checked_sub(fraction_len).ok_or_else(invalid)?;
    let power = usize::try_from(scale.unsigned_abs())
        .ok()
        .filter(|p| *p <= MAX_EXPONENT)
        .ok_or_else(invalid)?;
    let factor = num_traits::pow(BigInt::from(10), power);

    let value = if scale >= 0 {
        BigRational::from_integer(numer * factor)
    } else {
        BigRational::new(numer, factor)
    };

    Ok(if negative { -value } else { value })
}

/// Largest power of ten a decimal exponent may expand to.
const MAX_EXPONENT: usize = 4096;

/// Formats a rational with a fixed number of fractional digits, rounding
/// half away from zero. Negative values keep their sign even when they
/// round to zero.
pub fn format_decimal(value: &BigRational, precision: usize) -> String {
    let scale = num_traits::pow(BigInt::from(10), precision);
    let half = BigRational::new(BigInt::one(), BigInt::from(2));
    let scaled = value.abs() * BigRational::from_integer(scale);
    let rounded = (scaled + half).floor().to_integer();

    let digits = format!("{:0>width$}", rounded.to_string(), width = precision + 1);
    let split = digits.len() - precision;
    let sign = if value.is_negative() { "-" } else { "" };

    if precision == 0 {
        format!("{sign}{digits}")
    } else {
        format!("{sign}{}.{}", &digits[..split], &digits[split..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(n: i64, d: i64) -> Money {
        Money::from_fraction(n, d).unwrap()
    }

    #[test]
    fn from_fraction_reduces_to_lowest_terms() {
        let money = m(50, 100);
        assert_eq!(money.numerator(), &BigInt::from(1));
        assert_eq!(money.denominator(), &BigInt::from(2));
        assert_eq!(money.to_i64_parts().unwrap(), (1, 2));
    }

    #[test]
    fn negative_denominator_moves_sign_to_numerator() {
        let money = m(3, -4);
        assert_eq!(money.to_i64_parts().unwrap(), (-3, 4));
        assert!(money.is_negative());
    }

    #[test]
    fn from_fraction_rejects_zero_denominator() {
        assert_eq!(
            Money::from_fraction(1, 0).unwrap_err(),
            MoneyError::ZeroDenominator
        );
    }

    #[test]
    fn parses_decimal_and_fraction_forms() {
        assert_eq!(Money::from_decimal("19.99").unwrap(), m(1999, 100));
        assert_eq!(Money::from_decimal("1999/100").unwrap(), m(1999, 100));
        assert_eq!(Money::from_decimal("-0.5").unwrap(), m(-1, 2));
        assert_eq!(Money::from_decimal(".25").unwrap(), m(1, 4));
        assert_eq!(Money::from_decimal("100").unwrap(), m(100, 1));
        assert_eq!("0.01".parse::<Money>().unwrap(), m(1, 100));
    }

    #[test]
    fn parses_exponent_forms_exactly() {
        assert_eq!(Money::from_decimal("1.5e1").unwrap(), m(15, 1));
        assert_eq!(Money::from_decimal("1e-7").unwrap(), m(1, 10_000_000));
        assert_eq!(Money::from_decimal("2.5E+2").unwrap(), m(250, 1));
        assert_eq!(Money::from_decimal("-1.25e-1").unwrap(), m(-1, 8));
        assert_eq!(Money::from_decimal("12e0").unwrap(), m(12, 1));
    }

    #[test]
    fn rejects_unparseable_strings() {
        for bad in ["", "abc", "1.2.3", "1e", "e5", "1e5.5", "1e99999", "--1", "1/x", "."] {
            assert!(
                matches!(Money::from_decimal(bad), Err(MoneyError::InvalidDecimal(_))),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(
            Money::from_decimal("1/0").unwrap_err(),
            MoneyError::ZeroDenominator
        );
    }

    #[test]
    fn arithmetic_is_exact() {
        let a = m(1, 10);
        let b = m(2, 10);
        assert_eq!(&a + &b, m(3, 10));
        assert_eq!(&b - &a, m(1, 10));
        assert_eq!(&a * &b, m(1, 50));
        assert_eq!(a.clone() + b.clone() - b, a);
    }

    #[test]
    fn comparisons_and_sign_predicates() {
        assert!(m(1, 3) < m(1, 2));
        assert!(m(2, 4) == m(1, 2));
        assert!(m(0, 5).is_zero());
        assert!(m(1, 5).is_positive());
        assert!(m(-1, 5).is_negative());
        assert!(Money::zero().is_zero());
    }

    #[test]
    fn renders_with_half_away_from_zero_rounding() {
        assert_eq!(m(1999, 100).to_decimal_string(2), "19.99");
        assert_eq!(m(1, 3).to_decimal_string(4), "0.3333");
        assert_eq!(m(2, 3).to_decimal_string(2), "0.67");
        assert_eq!(m(5, 1000).to_decimal_string(2), "0.01");
        assert_eq!(m(-5, 1000).to_decimal_string(2), "-0.01");
        assert_eq!(m(15, 10).to_decimal_string(0), "2");
        assert_eq!(m(80, 1).to_decimal_string(10), "80.0000000000");
        assert_eq!(m(1999, 100).to_string(), "19.99");
    }

    #[test]
    fn to_i64_parts_reports_overflow() {
        let huge = Money::from_ratio(BigRational::from_integer(
            BigInt::from(i64::MAX) * BigInt::from(4),
        ));
        assert!(matches!(huge.to_i64_parts(), Err(MoneyError::Overflow(_))));
    }

    #[test]
    fn scale_by_ratio() {
        let price = m(100, 1);
        let fifth = BigRational::new(BigInt::from(1), BigInt::from(5));
        assert_eq!(price.scale(&fifth), m(20, 1));
    }
}
