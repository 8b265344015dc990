//! Product aggregate implementation.

use chrono::{DateTime, Utc};
use common::ProductId;

use crate::change_tracker::{ChangeTracker, Field};
use crate::money::Money;

use super::{
    Discount, ProductError, ProductEvent, ProductStatus,
    events::{
        DiscountAppliedData, DiscountRemovedData, PriceChangedData, ProductActivatedData,
        ProductArchivedData, ProductChanges, ProductCreatedData, ProductDeactivatedData,
        ProductUpdatedData,
    },
};

/// Maximum product name length, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum category length, in characters.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// Persisted fields used to rebuild a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductState {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub base_price: Money,
    pub discount: Option<Discount>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Product aggregate root.
///
/// Every business method validates before it mutates, so a failed call
/// leaves state, dirty fields and pending events untouched. A call that
/// changes something marks the affected fields dirty, stamps `updated_at`
/// with the caller's `now` and queues exactly one event.
#[derive(Debug, Clone)]
pub struct Product {
    id: ProductId,
    name: String,
    description: Option<String>,
    category: String,
    base_price: Money,
    discount: Option<Discount>,
    status: ProductStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    archived_at: Option<DateTime<Utc>>,
    changes: ChangeTracker,
    events: Vec<ProductEvent>,
}

fn validate_name(name: &str) -> Result<String, ProductError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProductError::EmptyName);
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ProductError::NameTooLong);
    }
    Ok(trimmed.to_string())
}

fn validate_category(category: &str) -> Result<String, ProductError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(ProductError::EmptyCategory);
    }
    if trimmed.chars().count() > MAX_CATEGORY_LENGTH {
        return Err(ProductError::CategoryTooLong);
    }
    Ok(trimmed.to_string())
}

fn validate_price(price: &Money) -> Result<(), ProductError> {
    if price.is_negative() {
        return Err(ProductError::NegativePrice);
    }
    if price.is_zero() {
        return Err(ProductError::ZeroPrice);
    }
    Ok(())
}

fn normalize_description(description: &str) -> Option<String> {
    Some(description.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// An empty string means "not provided".
fn provided(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl Product {
    /// Creates a new draft product and queues a `product.created` event.
    pub fn create(
        id: ProductId,
        name: &str,
        description: Option<&str>,
        category: &str,
        base_price: Money,
        now: DateTime<Utc>,
    ) -> Result<Self, ProductError> {
        let name = validate_name(name)?;
        let category = validate_category(category)?;
        validate_price(&base_price)?;

        let created = ProductEvent::Created(ProductCreatedData {
            product_id: id.clone(),
            name: name.clone(),
            category: category.clone(),
            base_price: base_price.clone(),
            created_at: now,
        });

        Ok(Self {
            id,
            name,
            description: description.and_then(normalize_description),
            category,
            base_price,
            discount: None,
            status: ProductStatus::Draft,
            created_at: now,
            updated_at: now,
            archived_at: None,
            changes: ChangeTracker::new(),
            events: vec![created],
        })
    }

    /// Rebuilds a product from persisted state. No events are queued and
    /// the change tracker starts clean.
    pub fn reconstruct(state: ProductState) -> Self {
        Self {
            id: state.id,
            name: state.name,
            description: state.description,
            category: state.category,
            base_price: state.base_price,
            discount: state.discount,
            status: state.status,
            created_at: state.created_at,
            updated_at: state.updated_at,
            archived_at: state.archived_at,
            changes: ChangeTracker::new(),
            events: Vec::new(),
        }
    }
}

// Query methods
impl Product {
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn base_price(&self) -> &Money {
        &self.base_price
    }

    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    /// Fields changed since the product was created or loaded.
    pub fn changes(&self) -> &ChangeTracker {
        &self.changes
    }

    /// Events queued by business methods and not yet taken.
    pub fn pending_events(&self) -> &[ProductEvent] {
        &self.events
    }

    /// Drains the pending events. Each event is handed out exactly once.
    pub fn take_events(&mut self) -> Vec<ProductEvent> {
        std::mem::take(&mut self.events)
    }

    /// Returns the discounted price when a discount is valid at `now`,
    /// otherwise the base price.
    pub fn effective_price(&self, now: DateTime<Utc>) -> Money {
        crate::pricing::effective_price(&self.base_price, self.discount.as_ref(), now)
    }
}

// Command methods
impl Product {
    /// Updates name, description and category.
    ///
    /// `None` and empty strings leave a field unchanged. Supplied name and
    /// category are trimmed and validated. One `product.updated` event lists
    /// the fields whose value actually changed; nothing is queued otherwise.
    pub fn update_details(
        &mut self,
        name: Option<&str>,
        description: Option<&str>,
        category: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), ProductError> {
        if self.status.is_terminal() {
            return Err(ProductError::Archived);
        }

        let name = provided(name).map(validate_name).transpose()?;
        let category = provided(category).map(validate_category).transpose()?;
        let description = provided(description).map(normalize_description);

        let mut changes = ProductChanges::default();

        if let Some(name) = name
            && name != self.name
        {
            self.name = name.clone();
            self.changes.mark_dirty(Field::Name);
            changes.name = Some(name);
        }

        if let Some(description) = description
            && description != self.description
        {
            changes.description = Some(description.clone().unwrap_or_default());
            self.description = description;
            self.changes.mark_dirty(Field::Description);
        }

        if let Some(category) = category
            && category != self.category
        {
            self.category = category.clone();
            self.changes.mark_dirty(Field::Category);
            changes.category = Some(category);
        }

        if changes.is_empty() {
            return Ok(());
        }

        self.updated_at = now;
        self.events.push(ProductEvent::Updated(ProductUpdatedData {
            product_id: self.id.clone(),
            changes,
            updated_at: now,
        }));

        Ok(())
    }

    /// Replaces the base price, queuing `price.changed` when it differs.
    pub fn update_price(&mut self, new_price: Money, now: DateTime<Utc>) -> Result<(), ProductError> {
        if self.status.is_terminal() {
            return Err(ProductError::Archived);
        }
        validate_price(&new_price)?;

        if new_price == self.base_price {
            return Ok(());
        }

        let old_price = std::mem::replace(&mut self.base_price, new_price.clone());
        self.changes.mark_dirty(Field::BasePrice);
        self.updated_at = now;
        self.events.push(ProductEvent::PriceChanged(PriceChangedData {
            product_id: self.id.clone(),
            old_price,
            new_price,
            changed_at: now,
        }));

        Ok(())
    }

    /// Puts the product on sale.
    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        if !self.status.can_activate() {
            return Err(match self.status {
                ProductStatus::Archived => ProductError::Archived,
                _ => ProductError::AlreadyActive,
            });
        }

        self.status = ProductStatus::Active;
        self.changes.mark_dirty(Field::Status);
        self.updated_at = now;
        self.events
            .push(ProductEvent::Activated(ProductActivatedData {
                product_id: self.id.clone(),
                activated_at: now,
            }));

        Ok(())
    }

    /// Withdraws the product from sale. Allowed from draft as well as active.
    pub fn deactivate(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        if !self.status.can_deactivate() {
            return Err(match self.status {
                ProductStatus::Archived => ProductError::Archived,
                _ => ProductError::AlreadyInactive,
            });
        }

        self.status = ProductStatus::Inactive;
        self.changes.mark_dirty(Field::Status);
        self.updated_at = now;
        self.events
            .push(ProductEvent::Deactivated(ProductDeactivatedData {
                product_id: self.id.clone(),
                deactivated_at: now,
            }));

        Ok(())
    }

    /// Archives a draft or inactive product. Archival is terminal.
    pub fn archive(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        if !self.status.can_archive() {
            return Err(match self.status {
                ProductStatus::Active => ProductError::CannotArchiveActive,
                _ => ProductError::Archived,
            });
        }

        self.status = ProductStatus::Archived;
        self.archived_at = Some(now);
        self.changes.mark_dirty(Field::Status);
        self.changes.mark_dirty(Field::ArchivedAt);
        self.updated_at = now;
        self.events.push(ProductEvent::Archived(ProductArchivedData {
            product_id: self.id.clone(),
            archived_at: now,
        }));

        Ok(())
    }

    /// Attaches a discount to an active product.
    ///
    /// Checks run in order: the product must not be archived and must be
    /// active, the discount must be valid at `now`, and no discount may
    /// already be attached.
    pub fn apply_discount(
        &mut self,
        discount: Discount,
        now: DateTime<Utc>,
    ) -> Result<(), ProductError> {
        if self.status.is_terminal() {
            return Err(ProductError::Archived);
        }
        if self.status != ProductStatus::Active {
            return Err(ProductError::NotActive);
        }
        if !discount.is_valid_at(now) {
            return Err(ProductError::DiscountNotValid);
        }
        if self.discount.is_some() {
            return Err(ProductError::DiscountAlreadyExists);
        }

        self.discount = Some(discount.clone());
        self.changes.mark_dirty(Field::Discount);
        self.updated_at = now;
        self.events
            .push(ProductEvent::DiscountApplied(DiscountAppliedData {
                product_id: self.id.clone(),
                discount,
                applied_at: now,
            }));

        Ok(())
    }

    /// Removes the discount. Without a discount this is a silent no-op.
    pub fn remove_discount(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        if self.status.is_terminal() {
            return Err(ProductError::Archived);
        }
        if self.discount.take().is_none() {
            return Ok(());
        }

        self.changes.mark_dirty(Field::Discount);
        self.updated_at = now;
        self.events
            .push(ProductEvent::DiscountRemoved(DiscountRemovedData {
                product_id: self.id.clone(),
                removed_at: now,
            }));

        Ok(())
    }
}
