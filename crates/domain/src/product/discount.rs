//! Percentage discount with a half-open validity window.

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed};

use super::ProductError;
use crate::money::Money;

fn hundred() -> BigRational {
    BigRational::from_integer(BigInt::from(100))
}

/// A discount: an exact ratio in `[0, 1]` valid over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discount {
    ratio: BigRational,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Discount {
    /// Builds a discount from a percentage on the 0–100 scale.
    pub fn from_percent(
        percent: BigRational,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, ProductError> {
        if percent.is_negative() || percent > hundred() {
            return Err(ProductError::InvalidDiscountPercentage);
        }
        Self::checked(percent / hundred(), start, end)
    }

    /// Builds a discount from a ratio already on the 0–1 scale.
    pub fn from_ratio(
        ratio: BigRational,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, ProductError> {
        if ratio.is_negative() || ratio > BigRational::one() {
            return Err(ProductError::InvalidDiscountPercentage);
        }
        Self::checked(ratio, start, end)
    }

    fn checked(
        ratio: BigRational,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, ProductError> {
        if end <= start {
            return Err(ProductError::InvalidDiscountPeriod);
        }
        Ok(Self { ratio, start, end })
    }

    /// True iff `start <= now < end`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.start && now < self.end
    }

    /// The amount taken off `price`.
    pub fn discount_amount(&self, price: &Money) -> Money {
        price.scale(&self.ratio)
    }

    /// Returns `price - price * ratio`.
    pub fn apply_to(&self, price: &Money) -> Money {
        price - &self.discount_amount(price)
    }

    /// The discount on the 0–100 scale.
    pub fn percentage(&self) -> BigRational {
        &self.ratio * hundred()
    }

    /// The discount on the 0–1 scale.
    pub fn ratio(&self) -> &BigRational {
        &self.ratio
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}
