//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::Utc;
use serial_test::serial;
use sqlx::{PgPool, Row};
use store::{Columns, Committer, Mutation, MutationPlan, PostgresStore, StoreError, Table, Value};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

const PRODUCTS: Table = Table::new("products", "product_id");
const OUTBOX: Table = Table::new("outbox_events", "event_id");

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_catalog_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE products, outbox_events")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn product_insert(id: &str) -> Mutation {
    let now = Utc::now();
    let mut columns = Columns::new();
    columns.insert("product_id", Value::text(id));
    columns.insert("name", Value::text("Desk Lamp"));
    columns.insert("description", Value::Text(None));
    columns.insert("category", Value::text("lighting"));
    columns.insert("base_price_numerator", Value::int(1999));
    columns.insert("base_price_denominator", Value::int(100));
    columns.insert("discount_percent", Value::Text(None));
    columns.insert("discount_start_date", Value::Timestamp(None));
    columns.insert("discount_end_date", Value::Timestamp(None));
    columns.insert("status", Value::text("draft"));
    columns.insert("created_at", Value::timestamp(now));
    columns.insert("updated_at", Value::timestamp(now));
    columns.insert("archived_at", Value::Timestamp(None));
    Mutation::insert(PRODUCTS, columns)
}

fn outbox_insert(event_id: &str, aggregate_id: &str) -> Mutation {
    let mut columns = Columns::new();
    columns.insert("event_id", Value::text(event_id));
    columns.insert("event_type", Value::text("product.created"));
    columns.insert("aggregate_id", Value::text(aggregate_id));
    columns.insert(
        "payload",
        Value::Json(serde_json::json!({ "product_id": aggregate_id })),
    );
    columns.insert("status", Value::text("pending"));
    columns.insert("created_at", Value::timestamp(Utc::now()));
    columns.insert("processed_at", Value::Timestamp(None));
    Mutation::insert(OUTBOX, columns)
}

async fn count(store: &PostgresStore, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
async fn commits_state_and_outbox_together() {
    let store = get_test_store().await;

    let mut plan = MutationPlan::new();
    plan.add(product_insert("p-1"));
    plan.add(outbox_insert("e-1", "p-1"));
    store.apply(plan).await.unwrap();

    assert_eq!(count(&store, "products").await, 1);
    assert_eq!(count(&store, "outbox_events").await, 1);

    let row = sqlx::query("SELECT status, payload FROM outbox_events WHERE event_id = 'e-1'")
        .fetch_one(store.pool())
        .await
        .unwrap();
    let status: String = row.get("status");
    let payload: serde_json::Value = row.get("payload");
    assert_eq!(status, "pending");
    assert_eq!(payload["product_id"], "p-1");
}

#[tokio::test]
#[serial]
async fn update_touches_only_given_columns() {
    let store = get_test_store().await;
    store
        .apply(vec![product_insert("p-1")].into_iter().collect())
        .await
        .unwrap();

    let mut columns = Columns::new();
    columns.insert("name", Value::text("Floor Lamp"));
    columns.insert("updated_at", Value::timestamp(Utc::now()));
    store
        .apply(
            vec![Mutation::update(PRODUCTS, "p-1", columns)]
                .into_iter()
                .collect(),
        )
        .await
        .unwrap();

    let row = sqlx::query("SELECT name, category FROM products WHERE product_id = 'p-1'")
        .fetch_one(store.pool())
        .await
        .unwrap();
    let name: String = row.get("name");
    let category: String = row.get("category");
    assert_eq!(name, "Floor Lamp");
    assert_eq!(category, "lighting");
}

#[tokio::test]
#[serial]
async fn failed_mutation_rolls_back_whole_plan() {
    let store = get_test_store().await;
    store
        .apply(vec![product_insert("p-1")].into_iter().collect())
        .await
        .unwrap();

    let mut plan = MutationPlan::new();
    plan.add(outbox_insert("e-2", "p-1"));
    plan.add(product_insert("p-1"));
    let err = store.apply(plan).await.unwrap_err();

    assert!(matches!(err, StoreError::AlreadyExists { table: "products", .. }));
    assert_eq!(count(&store, "outbox_events").await, 0);
}

#[tokio::test]
#[serial]
async fn update_of_missing_row_is_rejected() {
    let store = get_test_store().await;

    let mut columns = Columns::new();
    columns.insert("name", Value::text("Ghost"));
    let mut plan = MutationPlan::new();
    plan.add(outbox_insert("e-1", "missing"));
    plan.add(Mutation::update(PRODUCTS, "missing", columns));

    let err = store.apply(plan).await.unwrap_err();
    assert!(matches!(err, StoreError::RowNotFound { .. }));
    assert_eq!(count(&store, "outbox_events").await, 0);
}

#[tokio::test]
#[serial]
async fn empty_plan_is_a_noop() {
    let store = get_test_store().await;
    store.apply(MutationPlan::new()).await.unwrap();
    assert_eq!(count(&store, "products").await, 0);
}
