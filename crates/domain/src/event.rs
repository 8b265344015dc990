//! Domain event trait.

use chrono::{DateTime, Utc};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Send + Sync + Clone {
    /// Returns the event type name, e.g. `"product.created"`.
    ///
    /// This is the type tag persisted with every outbox entry.
    fn event_type(&self) -> &'static str;

    /// Returns the identifier of the aggregate the event belongs to.
    fn aggregate_id(&self) -> &str;

    /// Returns when the event happened.
    fn occurred_at(&self) -> DateTime<Utc>;
}
