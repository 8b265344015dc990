//! Query side: product views with their current effective price.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{Clock, ProductId};
use domain::{Discount, Money, ProductStatus, pricing};

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::read_model::{ListQuery, ProductSnapshot, ReadModel};

/// Fractional digits used when rendering effective prices.
pub const PRICE_PRECISION: usize = 10;

/// Full view of one product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductView {
    pub product_id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub base_price: Money,
    pub discount: Option<Discount>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
    /// Effective price at query time, rounded to [`PRICE_PRECISION`] digits.
    pub effective_price: String,
    /// Amount taken off the base price at query time, same precision.
    pub savings: String,
}

/// Compact view for list pages.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummaryView {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub base_price: Money,
    pub status: ProductStatus,
    pub effective_price: String,
}

impl ProductView {
    fn from_snapshot(snapshot: ProductSnapshot, now: DateTime<Utc>) -> Result<Self> {
        let product = snapshot.into_product()?;
        let effective_price = product.effective_price(now).to_decimal_string(PRICE_PRECISION);
        let savings = pricing::savings(product.base_price(), product.discount(), now)
            .to_decimal_string(PRICE_PRECISION);

        Ok(Self {
            product_id: product.id().clone(),
            name: product.name().to_string(),
            description: product.description().map(str::to_string),
            category: product.category().to_string(),
            base_price: product.base_price().clone(),
            discount: product.discount().cloned(),
            status: product.status(),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
            archived_at: product.archived_at(),
            effective_price,
            savings,
        })
    }
}

impl From<ProductView> for ProductSummaryView {
    fn from(view: ProductView) -> Self {
        Self {
            product_id: view.product_id,
            name: view.name,
            category: view.category,
            base_price: view.base_price,
            status: view.status,
            effective_price: view.effective_price,
        }
    }
}

/// Read-only handlers over a [`ReadModel`].
#[derive(Clone)]
pub struct ProductQueries {
    read_model: Arc<dyn ReadModel>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl ProductQueries {
    pub fn new(read_model: Arc<dyn ReadModel>, clock: Arc<dyn Clock>) -> Self {
        Self {
            read_model,
            clock,
            config: ServiceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<ProductView> {
        self.config
            .with_deadline(async {
                let snapshot = self.read_model.get_product(product_id).await?;
                ProductView::from_snapshot(snapshot, self.clock.now())
            })
            .await
    }

    /// Active products ordered by name.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self, query: ListQuery) -> Result<Vec<ProductSummaryView>> {
        self.config
            .with_deadline(async {
                let now = self.clock.now();
                self.read_model
                    .list_active_products(&query)
                    .await?
                    .into_iter()
                    .map(|s| ProductView::from_snapshot(s, now).map(ProductSummaryView::from))
                    .collect()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use common::FixedClock;
    use store::InMemoryStore;

    use crate::commands::{ActivateProduct, ApplyDiscount, CreateProduct};
    use crate::read_model::InMemoryReadModel;
    use crate::service::ProductService;

    #[tokio::test]
    async fn effective_price_follows_discount_window() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let store = InMemoryStore::new();
        let clock = Arc::new(FixedClock::new(t0));
        let read_model: Arc<dyn ReadModel> = Arc::new(InMemoryReadModel::new(store.clone()));
        let service = ProductService::new(read_model.clone(), Arc::new(store), clock.clone());
        let queries = ProductQueries::new(read_model, clock.clone());

        let id = service
            .create_product(CreateProduct::new(
                "Espresso Machine",
                "kitchen",
                Money::from_fraction(100, 1).unwrap(),
            ))
            .await
            .unwrap();
        service
            .activate_product(ActivateProduct::new(id.clone()))
            .await
            .unwrap();
        service
            .apply_discount(ApplyDiscount::new(
                id.clone(),
                domain::parse_rational("20").unwrap(),
                t0,
                t0 + Duration::hours(2),
            ))
            .await
            .unwrap();

        let view = queries.get_product(&id).await.unwrap();
        assert_eq!(view.effective_price, "80.0000000000");
        assert_eq!(view.savings, "20.0000000000");
        assert_eq!(view.status, ProductStatus::Active);

        clock.set(t0 + Duration::hours(2));
        let view = queries.get_product(&id).await.unwrap();
        assert_eq!(view.effective_price, "100.0000000000");
        assert_eq!(view.savings, "0.0000000000");

        let listed = queries.list_products(ListQuery::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].product_id, id);
        assert_eq!(listed[0].effective_price, "100.0000000000");
    }
}
