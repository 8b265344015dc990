//! Product command and query endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use catalog::{
    ActivateProduct, ApplyDiscount, ArchiveProduct, ChangePrice, CreateProduct,
    DeactivateProduct, ListQuery, ProductQueries, ProductService, ProductSummaryView,
    ProductView, RemoveDiscount, UpdateProduct,
};
use chrono::{DateTime, Utc};
use common::ProductId;
use domain::{BigRational, Money, parse_rational};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub service: ProductService,
    pub queries: ProductQueries,
}

// -- Request types --

/// An exact amount as `numerator / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: i64,
    pub denominator: i64,
}

impl Fraction {
    fn to_money(self) -> Result<Money, ApiError> {
        Money::from_fraction(self.numerator, self.denominator)
            .map_err(|e| ApiError::BadRequest(format!("invalid price: {e}")))
    }

    fn from_money(money: &Money) -> Result<Self, ApiError> {
        let (numerator, denominator) = money
            .to_i64_parts()
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(Self {
            numerator,
            denominator,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Optional caller-chosen id; retries with the same id are rejected.
    pub product_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub base_price: Fraction,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePriceRequest {
    pub price: Fraction,
}

#[derive(Debug, Deserialize)]
pub struct ApplyDiscountRequest {
    /// Percentage on the 0–100 scale, as a JSON number or a decimal/fraction string.
    pub percentage: serde_json::Value,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsParams {
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductCreatedResponse {
    pub product_id: String,
}

#[derive(Serialize)]
pub struct DiscountResponse {
    pub percentage: Fraction,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub product_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub base_price: Fraction,
    pub discount: Option<DiscountResponse>,
    pub effective_price: String,
    pub savings: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ProductSummaryResponse {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub base_price: Fraction,
    pub effective_price: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductSummaryResponse>,
    /// Offset of the next page, present when this page was full.
    pub next_offset: Option<i64>,
}

impl ProductResponse {
    fn from_view(view: ProductView) -> Result<Self, ApiError> {
        let discount = view
            .discount
            .as_ref()
            .map(|d| -> Result<_, ApiError> {
                Ok(DiscountResponse {
                    percentage: Fraction::from_money(&Money::from_ratio(d.percentage()))?,
                    start_date: d.start(),
                    end_date: d.end(),
                })
            })
            .transpose()?;

        Ok(Self {
            product_id: view.product_id.into_inner(),
            base_price: Fraction::from_money(&view.base_price)?,
            name: view.name,
            description: view.description,
            category: view.category,
            discount,
            effective_price: view.effective_price,
            savings: view.savings,
            status: view.status.to_string(),
            created_at: view.created_at,
            updated_at: view.updated_at,
            archived_at: view.archived_at,
        })
    }
}

impl ProductSummaryResponse {
    fn from_view(view: ProductSummaryView) -> Result<Self, ApiError> {
        Ok(Self {
            product_id: view.product_id.into_inner(),
            base_price: Fraction::from_money(&view.base_price)?,
            name: view.name,
            category: view.category,
            effective_price: view.effective_price,
            status: view.status.to_string(),
        })
    }
}

fn parse_percentage(value: &serde_json::Value) -> Result<BigRational, ApiError> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => {
            return Err(ApiError::BadRequest(
                "percentage must be a number or a string".to_string(),
            ));
        }
    };
    parse_rational(&text).map_err(|e| ApiError::BadRequest(format!("invalid percentage: {e}")))
}

// -- Handlers --

/// POST /products: create a new draft product.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductCreatedResponse>), ApiError> {
    let cmd = CreateProduct {
        product_id: req.product_id.filter(|id| !id.is_empty()).map(ProductId::new),
        name: req.name,
        description: req.description,
        category: req.category,
        base_price: req.base_price.to_money()?,
    };

    let product_id = state.service.create_product(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductCreatedResponse {
            product_id: product_id.into_inner(),
        }),
    ))
}

/// GET /products: list active products, optionally by category.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListProductsParams>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let query = ListQuery::new(params.category, params.limit, params.offset);
    let (limit, offset) = (query.limit, query.offset);

    let products = state
        .queries
        .list_products(query)
        .await?
        .into_iter()
        .map(ProductSummaryResponse::from_view)
        .collect::<Result<Vec<_>, _>>()?;

    let returned = i64::try_from(products.len()).unwrap_or(i64::MAX);
    let next_offset = (returned == limit).then_some(offset + returned);

    Ok(Json(ProductListResponse {
        products,
        next_offset,
    }))
}

/// GET /products/{id}: load one product with its effective price.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let view = state.queries.get_product(&ProductId::new(id)).await?;
    Ok(Json(ProductResponse::from_view(view)?))
}

/// PATCH /products/{id}: update name, description and category.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .update_product(UpdateProduct {
            product_id: ProductId::new(id),
            name: req.name,
            description: req.description,
            category: req.category,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /products/{id}/price: change the base price.
#[tracing::instrument(skip(state, req))]
pub async fn change_price(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ChangePriceRequest>,
) -> Result<StatusCode, ApiError> {
    let new_price = req.price.to_money()?;
    state
        .service
        .change_price(ChangePrice::new(ProductId::new(id), new_price))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /products/{id}/activate
#[tracing::instrument(skip(state))]
pub async fn activate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .activate_product(ActivateProduct::new(ProductId::new(id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /products/{id}/deactivate
#[tracing::instrument(skip(state))]
pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .deactivate_product(DeactivateProduct::new(ProductId::new(id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /products/{id}/archive
#[tracing::instrument(skip(state))]
pub async fn archive(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .archive_product(ArchiveProduct::new(ProductId::new(id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /products/{id}/discount: attach a discount.
#[tracing::instrument(skip(state, req))]
pub async fn apply_discount(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ApplyDiscountRequest>,
) -> Result<StatusCode, ApiError> {
    let percent = parse_percentage(&req.percentage)?;
    state
        .service
        .apply_discount(ApplyDiscount::new(
            ProductId::new(id),
            percent,
            req.start_date,
            req.end_date,
        ))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /products/{id}/discount: remove the discount, if any.
#[tracing::instrument(skip(state))]
pub async fn remove_discount(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .remove_discount(RemoveDiscount::new(ProductId::new(id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
