//! HTTP API server with observability for the product catalog.
//!
//! Exposes the catalog's write orchestrators and queries as REST endpoints,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use catalog::{
    InMemoryReadModel, PostgresReadModel, ProductQueries, ProductService, ReadModel,
    ServiceConfig,
};
use common::Clock;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use store::{Committer, InMemoryStore, PostgresStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::products::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/products",
            post(routes::products::create).get(routes::products::list),
        )
        .route(
            "/products/{id}",
            get(routes::products::get).patch(routes::products::update),
        )
        .route("/products/{id}/price", put(routes::products::change_price))
        .route("/products/{id}/activate", post(routes::products::activate))
        .route(
            "/products/{id}/deactivate",
            post(routes::products::deactivate),
        )
        .route("/products/{id}/archive", post(routes::products::archive))
        .route(
            "/products/{id}/discount",
            post(routes::products::apply_discount).delete(routes::products::remove_discount),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

fn build_state(
    read_model: Arc<dyn ReadModel>,
    committer: Arc<dyn Committer>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
) -> Arc<AppState> {
    Arc::new(AppState {
        service: ProductService::new(read_model.clone(), committer, clock.clone())
            .with_config(config),
        queries: ProductQueries::new(read_model, clock).with_config(config),
    })
}

/// Application state backed by a fresh in-memory store.
///
/// The store is returned as well so callers can inspect committed rows.
pub fn create_in_memory_state(
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
) -> (Arc<AppState>, InMemoryStore) {
    let store = InMemoryStore::new();
    let state = build_state(
        Arc::new(InMemoryReadModel::new(store.clone())),
        Arc::new(store.clone()),
        clock,
        config,
    );
    (state, store)
}

/// Application state backed by PostgreSQL.
pub fn create_postgres_state(
    pool: PgPool,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
) -> Arc<AppState> {
    build_state(
        Arc::new(PostgresReadModel::new(pool.clone())),
        Arc::new(PostgresStore::new(pool)),
        clock,
        config,
    )
}
