//! Outbox payloads: one JSON object per event kind.
//!
//! Money and percentages travel as `{ "numerator": .., "denominator": .. }`
//! so consumers never see a rounded amount.

use domain::{DomainEvent, Money, ProductEvent};
use serde_json::{Value, json};

use crate::error::Result;

fn fraction(money: &Money) -> Result<Value> {
    let (numerator, denominator) = money.to_i64_parts()?;
    Ok(json!({ "numerator": numerator, "denominator": denominator }))
}

/// Serializes an event to its at-rest JSON payload.
pub fn to_payload(event: &ProductEvent) -> Result<Value> {
    let occurred_at = event.occurred_at();

    let payload = match event {
        ProductEvent::Created(data) => json!({
            "product_id": data.product_id,
            "name": data.name,
            "category": data.category,
            "base_price": fraction(&data.base_price)?,
            "created_at": data.created_at,
        }),
        ProductEvent::Updated(data) => {
            let changes: serde_json::Map<String, Value> = data
                .changes
                .iter()
                .map(|(field, value)| (field.to_string(), Value::from(value)))
                .collect();
            json!({
                "product_id": data.product_id,
                "changes": changes,
                "updated_at": data.updated_at,
                "occurred_at": occurred_at,
            })
        }
        ProductEvent::Activated(data) => json!({
            "product_id": data.product_id,
            "activated_at": data.activated_at,
            "occurred_at": occurred_at,
            "event_type": event.event_type(),
            "aggregate_id": event.aggregate_id(),
        }),
        ProductEvent::Deactivated(data) => json!({
            "product_id": data.product_id,
            "deactivated_at": data.deactivated_at,
            "occurred_at": occurred_at,
        }),
        ProductEvent::Archived(data) => json!({
            "product_id": data.product_id,
            "archived_at": data.archived_at,
            "occurred_at": occurred_at,
        }),
        ProductEvent::DiscountApplied(data) => json!({
            "product_id": data.product_id,
            "discount_percent": fraction(&Money::from_ratio(data.discount.percentage()))?,
            "discount_start_date": data.discount.start(),
            "discount_end_date": data.discount.end(),
            "applied_at": data.applied_at,
            "occurred_at": occurred_at,
        }),
        ProductEvent::DiscountRemoved(data) => json!({
            "product_id": data.product_id,
            "removed_at": data.removed_at,
            "occurred_at": occurred_at,
        }),
        ProductEvent::PriceChanged(data) => json!({
            "product_id": data.product_id,
            "old_price": fraction(&data.old_price)?,
            "new_price": fraction(&data.new_price)?,
            "changed_at": data.changed_at,
            "occurred_at": occurred_at,
        }),
    };

    Ok(payload)
}
