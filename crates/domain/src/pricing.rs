//! Pricing rules shared by the aggregate and the read side.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::product::Discount;

/// Returns the discounted price when `discount` is valid at `now`, else
/// the base price.
pub fn effective_price(base: &Money, discount: Option<&Discount>, now: DateTime<Utc>) -> Money {
    match discount {
        Some(d) if d.is_valid_at(now) => d.apply_to(base),
        _ => base.clone(),
    }
}

/// Returns how much is saved off `base` at `now`; zero without a valid discount.
pub fn savings(base: &Money, discount: Option<&Discount>, now: DateTime<Utc>) -> Money {
    base - &effective_price(base, discount, now)
}
