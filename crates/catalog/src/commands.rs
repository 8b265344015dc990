//! Product commands.

use chrono::{DateTime, Utc};
use common::ProductId;
use domain::{BigRational, Money};

/// Command to create a new product.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    /// Caller-chosen id. A fresh one is generated when absent.
    pub product_id: Option<ProductId>,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub base_price: Money,
}

impl CreateProduct {
    /// Creates a new CreateProduct command with a generated id.
    pub fn new(name: impl Into<String>, category: impl Into<String>, base_price: Money) -> Self {
        Self {
            product_id: None,
            name: name.into(),
            description: None,
            category: category.into(),
            base_price,
        }
    }

    /// Pins the product id, so a retried create is rejected as a duplicate.
    pub fn with_id(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Command to update a product's name, description and category.
///
/// `None` and empty strings leave the field unchanged.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    pub product_id: ProductId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl UpdateProduct {
    pub fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            name: None,
            description: None,
            category: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Command to change a product's base price.
#[derive(Debug, Clone)]
pub struct ChangePrice {
    pub product_id: ProductId,
    pub new_price: Money,
}

impl ChangePrice {
    pub fn new(product_id: ProductId, new_price: Money) -> Self {
        Self {
            product_id,
            new_price,
        }
    }
}

/// Command to activate a product.
#[derive(Debug, Clone)]
pub struct ActivateProduct {
    pub product_id: ProductId,
}

/// Command to deactivate a product.
#[derive(Debug, Clone)]
pub struct DeactivateProduct {
    pub product_id: ProductId,
}

/// Command to archive a product.
#[derive(Debug, Clone)]
pub struct ArchiveProduct {
    pub product_id: ProductId,
}

/// Command to attach a percentage discount to a product.
#[derive(Debug, Clone)]
pub struct ApplyDiscount {
    pub product_id: ProductId,
    /// Percentage on the 0–100 scale.
    pub percent: BigRational,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl ApplyDiscount {
    pub fn new(
        product_id: ProductId,
        percent: BigRational,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            product_id,
            percent,
            start_date,
            end_date,
        }
    }
}

/// Command to remove a product's discount.
#[derive(Debug, Clone)]
pub struct RemoveDiscount {
    pub product_id: ProductId,
}

macro_rules! id_only_constructor {
    ($($command:ident),*) => {
        $(
            impl $command {
                pub fn new(product_id: ProductId) -> Self {
                    Self { product_id }
                }
            }
        )*
    };
}

id_only_constructor!(ActivateProduct, DeactivateProduct, ArchiveProduct, RemoveDiscount);
