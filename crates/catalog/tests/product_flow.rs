//! End-to-end command flows against the in-memory store.

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use catalog::schema::{outbox, products};
use catalog::{
    ActivateProduct, ApplyDiscount, ArchiveProduct, CatalogError, ChangePrice, CreateProduct,
    DeactivateProduct, InMemoryReadModel, ProductService, ReadModel, RemoveDiscount,
    ServiceConfig, UpdateProduct,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{FixedClock, ProductId};
use domain::{Money, ProductError, parse_rational};
use store::{Committer, InMemoryStore, MutationPlan, Row, StoreError, Value};

/// Committer that records every plan before applying it to the store.
#[derive(Clone)]
struct RecordingCommitter {
    store: InMemoryStore,
    plans: Arc<Mutex<Vec<MutationPlan>>>,
}

impl RecordingCommitter {
    fn last_plan(&self) -> MutationPlan {
        self.plans.lock().unwrap().last().cloned().unwrap()
    }

    fn plan_count(&self) -> usize {
        self.plans.lock().unwrap().len()
    }
}

#[async_trait]
impl Committer for RecordingCommitter {
    async fn apply(&self, plan: MutationPlan) -> store::Result<()> {
        self.plans.lock().unwrap().push(plan.clone());
        self.store.apply(plan).await
    }
}

/// Committer that never finishes in time.
struct SlowCommitter {
    inner: InMemoryStore,
}

#[async_trait]
impl Committer for SlowCommitter {
    async fn apply(&self, plan: MutationPlan) -> store::Result<()> {
        tokio::time::sleep(StdDuration::from_secs(60)).await;
        self.inner.apply(plan).await
    }
}

struct Harness {
    store: InMemoryStore,
    committer: RecordingCommitter,
    clock: Arc<FixedClock>,
    service: ProductService,
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
}

fn harness() -> Harness {
    let store = InMemoryStore::new();
    let committer = RecordingCommitter {
        store: store.clone(),
        plans: Arc::new(Mutex::new(Vec::new())),
    };
    let clock = Arc::new(FixedClock::new(t0()));
    let service = ProductService::new(
        Arc::new(InMemoryReadModel::new(store.clone())),
        Arc::new(committer.clone()),
        clock.clone(),
    );
    Harness {
        store,
        committer,
        clock,
        service,
    }
}

fn price(n: i64, d: i64) -> Money {
    Money::from_fraction(n, d).unwrap()
}

async fn create_lamp(h: &Harness) -> ProductId {
    h.service
        .create_product(
            CreateProduct::new("Desk Lamp", "lighting", price(1999, 100))
                .with_description("Adjustable arm"),
        )
        .await
        .unwrap()
}

async fn outbox_for(store: &InMemoryStore, id: &ProductId) -> Vec<Row> {
    store
        .rows(outbox::TABLE.name)
        .await
        .into_iter()
        .filter(|r| r[outbox::AGGREGATE_ID].as_str() == Some(id.as_str()))
        .collect()
}

fn event_types(rows: &[Row]) -> Vec<&str> {
    rows.iter()
        .filter_map(|r| r[outbox::EVENT_TYPE].as_str())
        .collect()
}

async fn product_row(store: &InMemoryStore, id: &ProductId) -> Row {
    store.row(products::TABLE.name, id.as_str()).await.unwrap()
}

#[tokio::test]
async fn create_writes_row_and_one_pending_outbox_entry() {
    let h = harness();
    let id = create_lamp(&h).await;

    let row = product_row(&h.store, &id).await;
    assert_eq!(row[products::STATUS], Value::text("draft"));
    assert_eq!(row[products::BASE_PRICE_NUMERATOR], Value::int(1999));
    assert_eq!(row[products::BASE_PRICE_DENOMINATOR], Value::int(100));
    assert_eq!(row[products::DESCRIPTION], Value::text("Adjustable arm"));

    let entries = outbox_for(&h.store, &id).await;
    assert_eq!(event_types(&entries), vec!["product.created"]);
    let entry = &entries[0];
    assert_eq!(entry[outbox::STATUS], Value::text("pending"));
    assert!(entry[outbox::PROCESSED_AT].is_null());
    assert_eq!(entry[outbox::CREATED_AT], Value::timestamp(t0()));

    let payload = entry[outbox::PAYLOAD].as_json().unwrap();
    assert_eq!(payload["name"], "Desk Lamp");
    assert_eq!(payload["base_price"]["numerator"], 1999);
    assert_eq!(payload["base_price"]["denominator"], 100);
}

#[tokio::test]
async fn update_touches_only_changed_columns_and_appends_event() {
    let h = harness();
    let id = create_lamp(&h).await;
    h.clock.advance(Duration::minutes(5));

    h.service
        .update_product(
            UpdateProduct::new(id.clone())
                .name("Floor Lamp")
                .category("home"),
        )
        .await
        .unwrap();

    let plan = h.committer.last_plan();
    let update = &plan.mutations()[0];
    let columns: Vec<_> = update.columns().keys().copied().collect();
    assert_eq!(
        columns,
        vec![products::CATEGORY, products::NAME, products::UPDATED_AT]
    );

    let entries = outbox_for(&h.store, &id).await;
    assert_eq!(
        event_types(&entries),
        vec!["product.created", "product.updated"]
    );
    let created_at = |r: &Row| r[outbox::CREATED_AT].as_timestamp().unwrap();
    assert!(created_at(&entries[0]) < created_at(&entries[1]));

    let payload = entries[1][outbox::PAYLOAD].as_json().unwrap();
    assert_eq!(payload["changes"]["name"], "Floor Lamp");
    assert_eq!(payload["changes"]["category"], "home");
    assert!(payload["changes"].get("description").is_none());

    let row = product_row(&h.store, &id).await;
    assert_eq!(row[products::NAME], Value::text("Floor Lamp"));
    assert_eq!(row[products::DESCRIPTION], Value::text("Adjustable arm"));
    assert_eq!(
        row[products::UPDATED_AT],
        Value::timestamp(t0() + Duration::minutes(5))
    );
}

#[tokio::test]
async fn update_without_changes_writes_nothing() {
    let h = harness();
    let id = create_lamp(&h).await;

    h.service
        .update_product(UpdateProduct::new(id.clone()).name("Desk Lamp"))
        .await
        .unwrap();

    assert_eq!(h.committer.plan_count(), 1, "only the create was committed");
    assert_eq!(outbox_for(&h.store, &id).await.len(), 1);
}

#[tokio::test]
async fn full_lifecycle_records_every_event_in_order() {
    let h = harness();
    let id = create_lamp(&h).await;

    h.service
        .activate_product(ActivateProduct::new(id.clone()))
        .await
        .unwrap();
    h.service
        .apply_discount(ApplyDiscount::new(
            id.clone(),
            parse_rational("20").unwrap(),
            t0(),
            t0() + Duration::hours(2),
        ))
        .await
        .unwrap();

    let row = product_row(&h.store, &id).await;
    assert_eq!(row[products::DISCOUNT_PERCENT], Value::text("1/5"));

    h.service
        .remove_discount(RemoveDiscount::new(id.clone()))
        .await
        .unwrap();
    h.service
        .change_price(ChangePrice::new(id.clone(), price(25, 1)))
        .await
        .unwrap();
    h.service
        .deactivate_product(DeactivateProduct::new(id.clone()))
        .await
        .unwrap();
    h.clock.advance(Duration::days(1));
    h.service
        .archive_product(ArchiveProduct::new(id.clone()))
        .await
        .unwrap();

    let entries = outbox_for(&h.store, &id).await;
    assert_eq!(
        event_types(&entries),
        vec![
            "product.created",
            "product.activated",
            "product.discount_applied",
            "product.discount_removed",
            "price.changed",
            "product.deactivated",
            "product.archived",
        ]
    );

    let archive_plan = h.committer.last_plan();
    let columns: Vec<_> = archive_plan.mutations()[0].columns().keys().copied().collect();
    assert_eq!(
        columns,
        vec![products::ARCHIVED_AT, products::STATUS, products::UPDATED_AT]
    );

    let row = product_row(&h.store, &id).await;
    assert_eq!(row[products::STATUS], Value::text("archived"));
    assert_eq!(row[products::BASE_PRICE_NUMERATOR], Value::int(25));
    assert!(row[products::DISCOUNT_PERCENT].is_null());
    assert_eq!(
        row[products::ARCHIVED_AT],
        Value::timestamp(t0() + Duration::days(1))
    );
}

#[tokio::test]
async fn business_rule_violations_write_nothing() {
    let h = harness();
    let id = create_lamp(&h).await;

    let err = h
        .service
        .apply_discount(ApplyDiscount::new(
            id.clone(),
            parse_rational("10").unwrap(),
            t0(),
            t0() + Duration::hours(1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Product(ProductError::NotActive)));

    h.service
        .activate_product(ActivateProduct::new(id.clone()))
        .await
        .unwrap();
    let err = h
        .service
        .activate_product(ActivateProduct::new(id.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Product(ProductError::AlreadyActive)));

    let err = h
        .service
        .archive_product(ArchiveProduct::new(id.clone()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Product(ProductError::CannotArchiveActive)
    ));

    let err = h
        .service
        .apply_discount(ApplyDiscount::new(
            id.clone(),
            parse_rational("150").unwrap(),
            t0(),
            t0() + Duration::hours(1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Product(ProductError::InvalidDiscountPercentage)
    ));

    assert_eq!(
        event_types(&outbox_for(&h.store, &id).await),
        vec!["product.created", "product.activated"]
    );
    let row = product_row(&h.store, &id).await;
    assert!(row[products::DISCOUNT_PERCENT].is_null());
}

#[tokio::test]
async fn removing_absent_discount_is_a_silent_no_op() {
    let h = harness();
    let id = create_lamp(&h).await;

    h.service
        .remove_discount(RemoveDiscount::new(id.clone()))
        .await
        .unwrap();

    assert_eq!(h.committer.plan_count(), 1, "only the create was committed");
    assert_eq!(outbox_for(&h.store, &id).await.len(), 1);
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let h = harness();
    let missing = ProductId::new("missing");

    let err = h
        .service
        .activate_product(ActivateProduct::new(missing.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(id) if id == missing));
}

#[tokio::test]
async fn rejected_commit_leaves_no_trace() {
    let h = harness();
    h.store.set_unavailable(true);

    let err = h
        .service
        .create_product(CreateProduct::new("Desk Lamp", "lighting", price(10, 1)))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Store(StoreError::Unavailable(_))));
    assert_eq!(h.store.row_count(products::TABLE.name).await, 0);
    assert_eq!(h.store.row_count(outbox::TABLE.name).await, 0);
}

#[tokio::test]
async fn rejected_update_commit_keeps_previous_state() {
    let h = harness();
    let id = create_lamp(&h).await;
    h.store.set_unavailable(true);

    let err = h
        .service
        .activate_product(ActivateProduct::new(id.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Store(StoreError::Unavailable(_))));

    let row = product_row(&h.store, &id).await;
    assert_eq!(row[products::STATUS], Value::text("draft"));
    assert_eq!(outbox_for(&h.store, &id).await.len(), 1);
}

#[tokio::test]
async fn retried_create_with_same_id_is_rejected() {
    let h = harness();
    let id = ProductId::new("lamp-001");
    let cmd = CreateProduct::new("Desk Lamp", "lighting", price(10, 1)).with_id(id.clone());

    let created = h.service.create_product(cmd.clone()).await.unwrap();
    assert_eq!(created, id);

    let err = h.service.create_product(cmd).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Store(StoreError::AlreadyExists { .. })
    ));
    assert_eq!(h.store.row_count(products::TABLE.name).await, 1);
    assert_eq!(outbox_for(&h.store, &id).await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn deadline_expiry_writes_nothing() {
    let store = InMemoryStore::new();
    let read_model: Arc<dyn ReadModel> = Arc::new(InMemoryReadModel::new(store.clone()));
    let service = ProductService::new(
        read_model,
        Arc::new(SlowCommitter {
            inner: store.clone(),
        }),
        Arc::new(FixedClock::new(t0())),
    )
    .with_config(ServiceConfig::with_timeout(StdDuration::from_millis(100)));

    let err = service
        .create_product(CreateProduct::new("Desk Lamp", "lighting", price(10, 1)))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::DeadlineExceeded(_)));
    assert_eq!(store.row_count(products::TABLE.name).await, 0);
    assert_eq!(store.row_count(outbox::TABLE.name).await, 0);
}
