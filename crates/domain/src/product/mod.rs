//! Product aggregate and related types.

mod aggregate;
mod discount;
mod events;
mod status;

pub use aggregate::{MAX_CATEGORY_LENGTH, MAX_NAME_LENGTH, Product, ProductState};
pub use discount::Discount;
pub use events::{
    DiscountAppliedData, DiscountRemovedData, PriceChangedData, ProductActivatedData,
    ProductArchivedData, ProductChanges, ProductCreatedData, ProductDeactivatedData, ProductEvent,
    ProductUpdatedData,
};
pub use status::{ProductStatus, UnknownStatus};

use thiserror::Error;

/// Business-rule violations raised by the product aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("product name cannot be empty")]
    EmptyName,

    #[error("product name exceeds maximum length of 255 characters")]
    NameTooLong,

    #[error("product category cannot be empty")]
    EmptyCategory,

    #[error("product category exceeds maximum length of 100 characters")]
    CategoryTooLong,

    #[error("price cannot be negative")]
    NegativePrice,

    #[error("price cannot be zero")]
    ZeroPrice,

    #[error("discount percentage must be between 0 and 100")]
    InvalidDiscountPercentage,

    #[error("discount end date must be after start date")]
    InvalidDiscountPeriod,

    #[error("product is not active")]
    NotActive,

    #[error("product is already active")]
    AlreadyActive,

    #[error("product is already inactive")]
    AlreadyInactive,

    #[error("product is archived")]
    Archived,

    #[error("cannot archive an active product")]
    CannotArchiveActive,

    #[error("discount is not valid at this time")]
    DiscountNotValid,

    #[error("product already has an active discount")]
    DiscountAlreadyExists,
}

impl ProductError {
    /// True for input validation failures, as opposed to state conflicts.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ProductError::EmptyName
                | ProductError::NameTooLong
                | ProductError::EmptyCategory
                | ProductError::CategoryTooLong
                | ProductError::NegativePrice
                | ProductError::ZeroPrice
                | ProductError::InvalidDiscountPercentage
                | ProductError::InvalidDiscountPeriod
        )
    }
}
