//! Write orchestrators.
//!
//! Every command follows the same protocol: load the product (or construct
//! a new one), invoke one business method with the clock's current instant,
//! turn the resulting state change and pending events into one
//! [`MutationPlan`], and hand the plan to the [`Committer`]. A rejected
//! business call returns before anything is planned, so nothing is written.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use common::{Clock, ProductId};
use domain::{Discount, Product, ProductError};
use store::{Committer, MutationPlan};
use tracing::{debug, warn};

use crate::commands::{
    ActivateProduct, ApplyDiscount, ArchiveProduct, ChangePrice, CreateProduct,
    DeactivateProduct, RemoveDiscount, UpdateProduct,
};
use crate::config::ServiceConfig;
use crate::error::{CatalogError, Result};
use crate::read_model::ReadModel;
use crate::repository::OutboxEntry;
use crate::repository::product::{insert_mutation, update_mutation};

/// Whether the product row must be inserted or updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persist {
    Insert,
    Update,
}

/// Builds the plan for one command: the product's row mutation followed by
/// one outbox insert per pending event, in emission order.
///
/// Drains the product's pending events. Every outbox entry is stamped with
/// `now`.
fn build_plan(product: &mut Product, persist: Persist, now: DateTime<Utc>) -> Result<MutationPlan> {
    let mut plan = MutationPlan::new();
    match persist {
        Persist::Insert => plan.add(insert_mutation(product)?),
        Persist::Update => plan.add(update_mutation(product)?),
    };

    for event in product.take_events() {
        let entry = OutboxEntry::capture(&event, now)?;
        plan.add(entry.insert_mutation());
    }

    Ok(plan)
}

/// Service for managing products.
///
/// Holds no per-request state. The read model, committer and clock are
/// injected once per process and shared by every call.
#[derive(Clone)]
pub struct ProductService {
    read_model: Arc<dyn ReadModel>,
    committer: Arc<dyn Committer>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl ProductService {
    pub fn new(
        read_model: Arc<dyn ReadModel>,
        committer: Arc<dyn Committer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            read_model,
            committer,
            clock,
            config: ServiceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates a new draft product and returns its id.
    ///
    /// A caller-supplied id is used as-is; retrying with the same id fails
    /// with the store's duplicate-key error.
    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<ProductId> {
        self.run("create_product", async {
            let now = self.clock.now();
            let product_id = cmd.product_id.clone().unwrap_or_else(ProductId::generate);

            let mut product = Product::create(
                product_id.clone(),
                &cmd.name,
                cmd.description.as_deref(),
                &cmd.category,
                cmd.base_price.clone(),
                now,
            )?;

            let plan = build_plan(&mut product, Persist::Insert, now)?;
            self.commit(plan).await?;
            Ok(product_id)
        })
        .await
    }

    /// Updates name, description and category.
    #[tracing::instrument(skip(self))]
    pub async fn update_product(&self, cmd: UpdateProduct) -> Result<()> {
        self.execute("update_product", &cmd.product_id, |product, now| {
            product.update_details(
                cmd.name.as_deref(),
                cmd.description.as_deref(),
                cmd.category.as_deref(),
                now,
            )
        })
        .await
    }

    /// Changes the base price.
    #[tracing::instrument(skip(self))]
    pub async fn change_price(&self, cmd: ChangePrice) -> Result<()> {
        self.execute("change_price", &cmd.product_id, |product, now| {
            product.update_price(cmd.new_price.clone(), now)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn activate_product(&self, cmd: ActivateProduct) -> Result<()> {
        self.execute("activate_product", &cmd.product_id, |product, now| {
            product.activate(now)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn deactivate_product(&self, cmd: DeactivateProduct) -> Result<()> {
        self.execute("deactivate_product", &cmd.product_id, |product, now| {
            product.deactivate(now)
        })
        .await
    }

    /// Archives a draft or inactive product.
    #[tracing::instrument(skip(self))]
    pub async fn archive_product(&self, cmd: ArchiveProduct) -> Result<()> {
        self.execute("archive_product", &cmd.product_id, |product, now| {
            product.archive(now)
        })
        .await
    }

    /// Attaches a percentage discount valid over `[start_date, end_date)`.
    #[tracing::instrument(skip(self))]
    pub async fn apply_discount(&self, cmd: ApplyDiscount) -> Result<()> {
        let discount = Discount::from_percent(cmd.percent.clone(), cmd.start_date, cmd.end_date);

        self.execute("apply_discount", &cmd.product_id, |product, now| {
            product.apply_discount(discount?, now)
        })
        .await
    }

    /// Removes the discount. Succeeds without writing when there is none.
    #[tracing::instrument(skip(self))]
    pub async fn remove_discount(&self, cmd: RemoveDiscount) -> Result<()> {
        self.execute("remove_discount", &cmd.product_id, |product, now| {
            product.remove_discount(now)
        })
        .await
    }

    /// Load, mutate, plan and commit for an existing product.
    async fn execute<F>(&self, command: &'static str, product_id: &ProductId, action: F) -> Result<()>
    where
        F: FnOnce(&mut Product, DateTime<Utc>) -> std::result::Result<(), ProductError> + Send,
    {
        self.run(command, async {
            let now = self.clock.now();
            let mut product = self
                .read_model
                .get_product(product_id)
                .await?
                .into_product()?;

            action(&mut product, now)?;

            let plan = build_plan(&mut product, Persist::Update, now)?;
            if plan.is_empty() {
                debug!(command, product_id = %product_id, "nothing changed");
                return Ok(());
            }
            self.commit(plan).await
        })
        .await
    }

    async fn commit(&self, plan: MutationPlan) -> Result<()> {
        let event_types: Vec<_> = plan
            .mutations()
            .iter()
            .filter(|m| m.table() == crate::schema::outbox::TABLE)
            .filter_map(|m| m.columns().get(crate::schema::outbox::EVENT_TYPE))
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect();

        let started = Instant::now();
        self.committer.apply(plan).await?;
        metrics::histogram!("catalog_commit_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        for event_type in event_types {
            metrics::counter!("catalog_outbox_events_captured_total", "event_type" => event_type)
                .increment(1);
        }
        Ok(())
    }

    /// Applies the deadline and records the command's outcome.
    async fn run<T, F>(&self, command: &'static str, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let result = self.config.with_deadline(operation).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(CatalogError::Product(e)) => {
                debug!(command, error = %e, "command rejected");
                "rejected"
            }
            Err(e) => {
                warn!(command, error = %e, "command failed");
                "failed"
            }
        };
        metrics::counter!("catalog_commands_total", "command" => command, "outcome" => outcome)
            .increment(1);

        result
    }
}
