use async_trait::async_trait;
use common::ProductId;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{ListQuery, ProductSnapshot, ReadModel};
use crate::error::{CatalogError, Result};

const PRODUCT_COLUMNS: &str = "product_id, name, description, category, \
     base_price_numerator, base_price_denominator, \
     discount_percent, discount_start_date, discount_end_date, \
     status, created_at, updated_at, archived_at";

/// PostgreSQL-backed read model over the `products` table.
#[derive(Clone)]
pub struct PostgresReadModel {
    pool: PgPool,
}

impl PostgresReadModel {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_snapshot(row: PgRow) -> Result<ProductSnapshot> {
        Ok(ProductSnapshot {
            product_id: row.try_get("product_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            base_price_numerator: row.try_get("base_price_numerator")?,
            base_price_denominator: row.try_get("base_price_denominator")?,
            discount_percent: row.try_get("discount_percent")?,
            discount_start_date: row.try_get("discount_start_date")?,
            discount_end_date: row.try_get("discount_end_date")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            archived_at: row.try_get("archived_at")?,
        })
    }
}

#[async_trait]
impl ReadModel for PostgresReadModel {
    async fn get_product(&self, product_id: &ProductId) -> Result<ProductSnapshot> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1");
        let row = sqlx::query(&sql)
            .bind(product_id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogError::NotFound(product_id.clone()))?;

        Self::row_to_snapshot(row)
    }

    async fn list_active_products(&self, query: &ListQuery) -> Result<Vec<ProductSnapshot>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE status = 'active' AND ($1::TEXT IS NULL OR category = $1) \
             ORDER BY name ASC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&sql)
            .bind(query.category.as_deref())
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_snapshot).collect()
    }
}
