use async_trait::async_trait;
use common::ProductId;
use domain::ProductStatus;
use store::{InMemoryStore, Row};

use super::{ListQuery, ProductSnapshot, ReadModel};
use crate::error::{CatalogError, Result};
use crate::schema::products as col;

/// Read model over the rows of an [`InMemoryStore`].
///
/// Shares the store's tables, so a committed plan is visible to the next
/// load without any projection step.
#[derive(Clone)]
pub struct InMemoryReadModel {
    store: InMemoryStore,
}

impl InMemoryReadModel {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

fn text(row: &Row, key: &str, column: &str) -> Result<String> {
    optional_text(row, column)
        .ok_or_else(|| CatalogError::corrupt(key, format!("missing column {column}")))
}

fn optional_text(row: &Row, column: &str) -> Option<String> {
    row.get(column).and_then(|v| v.as_str()).map(str::to_string)
}

fn int(row: &Row, key: &str, column: &str) -> Result<i64> {
    row.get(column)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| CatalogError::corrupt(key, format!("missing column {column}")))
}

fn timestamp(row: &Row, key: &str, column: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    row.get(column)
        .and_then(|v| v.as_timestamp())
        .ok_or_else(|| CatalogError::corrupt(key, format!("missing column {column}")))
}

fn optional_timestamp(row: &Row, column: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    row.get(column).and_then(|v| v.as_timestamp())
}

fn snapshot_from_row(key: &str, row: &Row) -> Result<ProductSnapshot> {
    Ok(ProductSnapshot {
        product_id: text(row, key, col::PRODUCT_ID)?,
        name: text(row, key, col::NAME)?,
        description: optional_text(row, col::DESCRIPTION),
        category: text(row, key, col::CATEGORY)?,
        base_price_numerator: int(row, key, col::BASE_PRICE_NUMERATOR)?,
        base_price_denominator: int(row, key, col::BASE_PRICE_DENOMINATOR)?,
        discount_percent: optional_text(row, col::DISCOUNT_PERCENT),
        discount_start_date: optional_timestamp(row, col::DISCOUNT_START_DATE),
        discount_end_date: optional_timestamp(row, col::DISCOUNT_END_DATE),
        status: text(row, key, col::STATUS)?,
        created_at: timestamp(row, key, col::CREATED_AT)?,
        updated_at: timestamp(row, key, col::UPDATED_AT)?,
        archived_at: optional_timestamp(row, col::ARCHIVED_AT),
    })
}

#[async_trait]
impl ReadModel for InMemoryReadModel {
    async fn get_product(&self, product_id: &ProductId) -> Result<ProductSnapshot> {
        let row = self
            .store
            .row(col::TABLE.name, product_id.as_str())
            .await
            .ok_or_else(|| CatalogError::NotFound(product_id.clone()))?;
        snapshot_from_row(product_id.as_str(), &row)
    }

    async fn list_active_products(&self, query: &ListQuery) -> Result<Vec<ProductSnapshot>> {
        let active = ProductStatus::Active.as_str();
        let mut matching = Vec::new();

        for row in self.store.rows(col::TABLE.name).await {
            let key = optional_text(&row, col::PRODUCT_ID).unwrap_or_default();
            let snapshot = snapshot_from_row(&key, &row)?;
            let in_category = query
                .category
                .as_deref()
                .is_none_or(|c| c == snapshot.category);
            if snapshot.status == active && in_category {
                matching.push(snapshot);
            }
        }

        matching.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(matching
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(0))
            .take(usize::try_from(query.limit).unwrap_or(0))
            .collect())
    }
}
