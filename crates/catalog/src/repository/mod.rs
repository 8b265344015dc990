//! Mutation builders for the products and outbox tables.
//!
//! Builders are stateless functions: they read an aggregate or an outbox
//! entry and describe the write, the committer performs it.

pub mod outbox;
pub mod product;

pub use outbox::{OutboxEntry, OutboxStatus};
