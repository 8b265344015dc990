//! Storage plumbing for the product catalog.
//!
//! Business code never talks SQL. It describes what must change as a
//! [`MutationPlan`] and hands the plan to a [`Committer`], which applies every
//! mutation inside one atomic unit or none of them.

pub mod committer;
pub mod error;
pub mod memory;
pub mod mutation;
pub mod postgres;
pub mod value;

pub use committer::Committer;
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use mutation::{Mutation, MutationPlan};
pub use postgres::PostgresStore;
pub use value::{Columns, Row, Table, Value};
