//! Load path: persisted product rows and the collaborators that fetch them.

mod memory;
mod postgres;

pub use memory::InMemoryReadModel;
pub use postgres::PostgresReadModel;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::ProductId;
use domain::{Discount, Money, Product, ProductState, ProductStatus, parse_rational};

use crate::error::{CatalogError, Result};

/// Default page size for list queries.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a list query may request.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Every persisted column of a product row, as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub product_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub base_price_numerator: i64,
    pub base_price_denominator: i64,
    /// Discount on the 0–1 scale, as a fraction (`"1/5"`) or decimal (`"0.2"`).
    pub discount_percent: Option<String>,
    pub discount_start_date: Option<DateTime<Utc>>,
    pub discount_end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl ProductSnapshot {
    pub fn base_price(&self) -> Result<Money> {
        Money::from_fraction(self.base_price_numerator, self.base_price_denominator)
            .map_err(|e| CatalogError::corrupt(&self.product_id, e))
    }

    /// The stored discount, or `None` when the row has none.
    ///
    /// A percent without both window bounds is a corrupt row.
    pub fn discount(&self) -> Result<Option<Discount>> {
        let Some(percent) = self.discount_percent.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(None);
        };
        let (Some(start), Some(end)) = (self.discount_start_date, self.discount_end_date) else {
            return Err(CatalogError::corrupt(
                &self.product_id,
                "discount without validity window",
            ));
        };

        let ratio = parse_rational(percent).map_err(|e| CatalogError::corrupt(&self.product_id, e))?;
        Discount::from_ratio(ratio, start, end)
            .map(Some)
            .map_err(|e| CatalogError::corrupt(&self.product_id, e))
    }

    pub fn status(&self) -> Result<ProductStatus> {
        self.status
            .parse()
            .map_err(|e| CatalogError::corrupt(&self.product_id, e))
    }

    /// Rebuilds the aggregate with a clean change tracker.
    pub fn into_product(self) -> Result<Product> {
        let base_price = self.base_price()?;
        let discount = self.discount()?;
        let status = self.status()?;

        Ok(Product::reconstruct(ProductState {
            id: ProductId::new(self.product_id),
            name: self.name,
            description: self.description,
            category: self.category,
            base_price,
            discount,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            archived_at: self.archived_at,
        }))
    }
}

/// Filter and page for listing active products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub category: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl ListQuery {
    /// Builds a page request. Non-positive limits fall back to
    /// [`DEFAULT_PAGE_SIZE`], large ones are capped at [`MAX_PAGE_SIZE`] and
    /// negative offsets start from zero.
    pub fn new(category: Option<String>, limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        Self {
            category: category.filter(|c| !c.is_empty()),
            limit,
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// Read collaborator used by the write orchestrators and the query side.
#[async_trait]
pub trait ReadModel: Send + Sync {
    /// Fetches one product row; [`CatalogError::NotFound`] when absent.
    async fn get_product(&self, product_id: &ProductId) -> Result<ProductSnapshot>;

    /// Active products, optionally in one category, ordered by name.
    async fn list_active_products(&self, query: &ListQuery) -> Result<Vec<ProductSnapshot>>;
}
