//! Product catalog application layer.
//!
//! Write orchestrators ([`ProductService`]) turn one command into one atomic
//! [`store::MutationPlan`] holding both the product's row change and its
//! outbox entries. [`ProductQueries`] serves the read side.

pub mod commands;
pub mod config;
pub mod error;
pub mod payload;
pub mod queries;
pub mod read_model;
pub mod repository;
pub mod schema;
pub mod service;

pub use commands::{
    ActivateProduct, ApplyDiscount, ArchiveProduct, ChangePrice, CreateProduct,
    DeactivateProduct, RemoveDiscount, UpdateProduct,
};
pub use config::ServiceConfig;
pub use error::{CatalogError, Result};
pub use queries::{PRICE_PRECISION, ProductQueries, ProductSummaryView, ProductView};
pub use read_model::{
    InMemoryReadModel, ListQuery, PostgresReadModel, ProductSnapshot, ReadModel,
};
pub use repository::{OutboxEntry, OutboxStatus};
pub use service::ProductService;
