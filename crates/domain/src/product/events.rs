//! Product domain events.

use chrono::{DateTime, Utc};
use common::ProductId;

use crate::event::DomainEvent;
use crate::money::Money;

use super::Discount;

/// Events that can occur on a product aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductEvent {
    /// Product was created.
    Created(ProductCreatedData),

    /// Name, description or category changed.
    Updated(ProductUpdatedData),

    /// Product was put on sale.
    Activated(ProductActivatedData),

    /// Product was withdrawn from sale.
    Deactivated(ProductDeactivatedData),

    /// Product was archived.
    Archived(ProductArchivedData),

    /// A discount was attached.
    DiscountApplied(DiscountAppliedData),

    /// The discount was removed.
    DiscountRemoved(DiscountRemovedData),

    /// The base price changed.
    PriceChanged(PriceChangedData),
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::Created(_) => "product.created",
            ProductEvent::Updated(_) => "product.updated",
            ProductEvent::Activated(_) => "product.activated",
            ProductEvent::Deactivated(_) => "product.deactivated",
            ProductEvent::Archived(_) => "product.archived",
            ProductEvent::DiscountApplied(_) => "product.discount_applied",
            ProductEvent::DiscountRemoved(_) => "product.discount_removed",
            ProductEvent::PriceChanged(_) => "price.changed",
        }
    }

    fn aggregate_id(&self) -> &str {
        self.product_id().as_str()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::Created(data) => data.created_at,
            ProductEvent::Updated(data) => data.updated_at,
            ProductEvent::Activated(data) => data.activated_at,
            ProductEvent::Deactivated(data) => data.deactivated_at,
            ProductEvent::Archived(data) => data.archived_at,
            ProductEvent::DiscountApplied(data) => data.applied_at,
            ProductEvent::DiscountRemoved(data) => data.removed_at,
            ProductEvent::PriceChanged(data) => data.changed_at,
        }
    }
}

impl ProductEvent {
    /// Returns the product the event belongs to.
    pub fn product_id(&self) -> &ProductId {
        match self {
            ProductEvent::Created(data) => &data.product_id,
            ProductEvent::Updated(data) => &data.product_id,
            ProductEvent::Activated(data) => &data.product_id,
            ProductEvent::Deactivated(data) => &data.product_id,
            ProductEvent::Archived(data) => &data.product_id,
            ProductEvent::DiscountApplied(data) => &data.product_id,
            ProductEvent::DiscountRemoved(data) => &data.product_id,
            ProductEvent::PriceChanged(data) => &data.product_id,
        }
    }
}

/// Data for the `product.created` event.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCreatedData {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub base_price: Money,
    pub created_at: DateTime<Utc>,
}

/// The detail fields that changed in a `product.updated` event.
/// Only changed fields are `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.category.is_none()
    }

    /// Changed fields as `(field name, new value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("name", self.name.as_deref()),
            ("description", self.description.as_deref()),
            ("category", self.category.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
    }
}

/// Data for the `product.updated` event.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdatedData {
    pub product_id: ProductId,
    pub changes: ProductChanges,
    pub updated_at: DateTime<Utc>,
}

/// Data for the `product.activated` event.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductActivatedData {
    pub product_id: ProductId,
    pub activated_at: DateTime<Utc>,
}

/// Data for the `product.deactivated` event.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDeactivatedData {
    pub product_id: ProductId,
    pub deactivated_at: DateTime<Utc>,
}

/// Data for the `product.archived` event.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductArchivedData {
    pub product_id: ProductId,
    pub archived_at: DateTime<Utc>,
}

/// Data for the `product.discount_applied` event.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountAppliedData {
    pub product_id: ProductId,
    pub discount: Discount,
    pub applied_at: DateTime<Utc>,
}

/// Data for the `product.discount_removed` event.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountRemovedData {
    pub product_id: ProductId,
    pub removed_at: DateTime<Utc>,
}

/// Data for the `price.changed` event.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChangedData {
    pub product_id: ProductId,
    pub old_price: Money,
    pub new_price: Money,
    pub changed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_iterate_only_set_fields() {
        let changes = ProductChanges {
            name: Some("Lamp".into()),
            description: None,
            category: Some("lighting".into()),
        };
        let pairs: Vec<_> = changes.iter().collect();
        assert_eq!(pairs, vec![("name", "Lamp"), ("category", "lighting")]);
        assert!(!changes.is_empty());
        assert!(ProductChanges::default().is_empty());
    }

    #[test]
    fn event_type_tags() {
        let now = Utc::now();
        let id = ProductId::new("p-1");
        let event = ProductEvent::PriceChanged(PriceChangedData {
            product_id: id.clone(),
            old_price: Money::from_fraction(1, 1).unwrap(),
            new_price: Money::from_fraction(2, 1).unwrap(),
            changed_at: now,
        });
        assert_eq!(event.event_type(), "price.changed");
        assert_eq!(event.aggregate_id(), "p-1");
        assert_eq!(event.occurred_at(), now);

        let event = ProductEvent::DiscountRemoved(DiscountRemovedData {
            product_id: id,
            removed_at: now,
        });
        assert_eq!(event.event_type(), "product.discount_removed");
    }
}
