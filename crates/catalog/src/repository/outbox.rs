use chrono::{DateTime, Utc};
use domain::{DomainEvent, ProductEvent};
use store::{Columns, Mutation, Value};
use uuid::Uuid;

use crate::error::Result;
use crate::payload;
use crate::schema::outbox as col;

/// Delivery status of an outbox entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxStatus {
    /// Captured, waiting for the publisher.
    Pending,
    /// Delivered by the publisher.
    Processed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Processed => "processed",
        }
    }
}

impl std::fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured domain event, ready to be written to the outbox.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxEntry {
    pub event_id: String,
    pub event_type: &'static str,
    pub aggregate_id: String,
    pub payload: serde_json::Value,
    pub status: OutboxStatus,
    pub created_at: DateTime<Utc>,
}

impl OutboxEntry {
    /// Captures `event` with a fresh event id and `pending` status.
    pub fn capture(event: &ProductEvent, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            event_id: Uuid::new_v4().to_string(),
            event_type: event.event_type(),
            aggregate_id: event.aggregate_id().to_string(),
            payload: payload::to_payload(event)?,
            status: OutboxStatus::Pending,
            created_at: now,
        })
    }

    /// Insert of this entry; `processed_at` starts NULL.
    pub fn insert_mutation(&self) -> Mutation {
        let mut columns = Columns::new();
        columns.insert(col::EVENT_ID, Value::text(self.event_id.as_str()));
        columns.insert(col::EVENT_TYPE, Value::text(self.event_type));
        columns.insert(col::AGGREGATE_ID, Value::text(self.aggregate_id.as_str()));
        columns.insert(col::PAYLOAD, Value::Json(self.payload.clone()));
        columns.insert(col::STATUS, Value::text(self.status.as_str()));
        columns.insert(col::CREATED_AT, Value::timestamp(self.created_at));
        columns.insert(col::PROCESSED_AT, Value::Timestamp(None));
        Mutation::insert(col::TABLE, columns)
    }
}
