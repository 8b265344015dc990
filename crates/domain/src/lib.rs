//! Domain layer for the product catalog.
//!
//! This crate provides the write-side model:
//! - `Money`, an exact rational amount
//! - `Discount`, a percentage with a half-open validity window
//! - `ChangeTracker` for dirty-field tracking
//! - the `Product` aggregate with its status machine and `ProductEvent`s

pub mod change_tracker;
pub mod event;
pub mod money;
pub mod pricing;
pub mod product;

pub use change_tracker::{ChangeTracker, Field};
pub use event::DomainEvent;
pub use money::{Money, MoneyError, parse_rational};
pub use product::{
    Discount, DiscountAppliedData, DiscountRemovedData, PriceChangedData, Product,
    ProductActivatedData, ProductArchivedData, ProductChanges, ProductCreatedData,
    ProductDeactivatedData, ProductError, ProductEvent, ProductState, ProductStatus,
    ProductUpdatedData, UnknownStatus,
};

pub use num_rational::BigRational;
