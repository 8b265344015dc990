//! Application error types.

use common::ProductId;
use domain::{MoneyError, ProductError};
use store::StoreError;
use thiserror::Error;

/// Errors returned by the catalog's command and query handlers.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A business rule of the product aggregate was violated.
    #[error("{0}")]
    Product(#[from] ProductError),

    /// A monetary amount or percentage could not be built.
    #[error("{0}")]
    Money(#[from] MoneyError),

    /// No product exists with the given id.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The commit or read collaborator failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The read model returned a row that cannot be turned back into a product.
    #[error("Corrupt product record {product_id}: {reason}")]
    CorruptRecord { product_id: String, reason: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The operation did not finish within its deadline. Nothing was written.
    #[error("operation timed out after {0:?}")]
    DeadlineExceeded(std::time::Duration),
}

impl CatalogError {
    pub(crate) fn corrupt(product_id: impl Into<String>, reason: impl ToString) -> Self {
        CatalogError::CorruptRecord {
            product_id: product_id.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::Store(StoreError::Database(e))
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
