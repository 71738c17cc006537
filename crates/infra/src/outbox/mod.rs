//! Outbox encoding: one insert operation per domain event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use catalog_core::{Classify, ErrorKind, EventId};
use catalog_events::{Event, Metadata, OutboxEnvelope};

use crate::commit::{Columns, Operation, StoredRow, Table, Value};

/// Initial status of every outbox record. Later transitions belong to the relay.
pub const STATUS_PENDING: &str = "pending";

#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("failed to encode outbox payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("stored outbox record has invalid {column}")]
    Corrupt { column: &'static str },
}

impl Classify for OutboxError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Infrastructure
    }
}

/// Turns a domain event and caller metadata into an outbox insert.
pub trait OutboxSink<E>: Send + Sync {
    fn build_insert_op(&self, event: &E, metadata: &Metadata) -> Result<Operation, OutboxError>;
}

/// Encodes `{"event": .., "metadata": ..}` as the JSON payload.
#[derive(Debug, Copy, Clone, Default)]
pub struct JsonOutbox;

impl JsonOutbox {
    pub fn new() -> Self {
        Self
    }
}

impl<E> OutboxSink<E> for JsonOutbox
where
    E: Event + Serialize,
{
    fn build_insert_op(&self, event: &E, metadata: &Metadata) -> Result<Operation, OutboxError> {
        let payload = OutboxEnvelope::new(event, metadata).to_json()?;
        let record = OutboxRecord {
            event_id: EventId::new(),
            event_type: event.event_type().to_string(),
            aggregate_id: event.aggregate_id(),
            payload,
            status: STATUS_PENDING.to_string(),
            created_at: event.occurred_at(),
            processed_at: None,
        };
        Ok(Operation::Insert {
            table: Table::OutboxEvents,
            row: record.into_columns(),
        })
    }
}

/// One `outbox_events` row.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxRecord {
    pub event_id: EventId,
    pub event_type: String,
    pub aggregate_id: String,
    pub payload: JsonValue,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl OutboxRecord {
    pub fn into_columns(self) -> Columns {
        vec![
            ("event_id", Value::Uuid(*self.event_id.as_uuid())),
            ("event_type", Value::text(self.event_type)),
            ("aggregate_id", Value::text(self.aggregate_id)),
            ("payload", Value::Json(self.payload)),
            ("status", Value::text(self.status)),
            ("created_at", Value::timestamp(self.created_at)),
            ("processed_at", Value::Timestamp(self.processed_at)),
        ]
    }

    pub fn from_stored(row: &StoredRow) -> Result<Self, OutboxError> {
        let text = |column: &'static str| match row.get(column) {
            Some(Value::Text(Some(s))) => Ok(s.clone()),
            _ => Err(OutboxError::Corrupt { column }),
        };
        let event_id = match row.get("event_id") {
            Some(Value::Uuid(u)) => EventId::from_uuid(*u),
            _ => return Err(OutboxError::Corrupt { column: "event_id" }),
        };
        let payload = match row.get("payload") {
            Some(Value::Json(j)) => j.clone(),
            _ => return Err(OutboxError::Corrupt { column: "payload" }),
        };
        let created_at = match row.get("created_at") {
            Some(Value::Timestamp(Some(t))) => *t,
            _ => return Err(OutboxError::Corrupt { column: "created_at" }),
        };
        let processed_at = match row.get("processed_at") {
            Some(Value::Timestamp(t)) => *t,
            _ => return Err(OutboxError::Corrupt { column: "processed_at" }),
        };

        Ok(Self {
            event_id,
            event_type: text("event_type")?,
            aggregate_id: text("aggregate_id")?,
            payload,
            status: text("status")?,
            created_at,
            processed_at,
        })
    }

    /// Event id as a plain uuid, for correlation in logs.
    pub fn uuid(&self) -> Uuid {
        *self.event_id.as_uuid()
    }
}
