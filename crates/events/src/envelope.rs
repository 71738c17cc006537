use serde::Serialize;

use crate::Metadata;

/// The payload persisted in an outbox record: exactly `{event, metadata}`.
///
/// Consumers read `event.type` to discriminate and the remaining `event`
/// fields for the data. The envelope borrows so encoding never clones the event.
#[derive(Debug, Serialize)]
pub struct OutboxEnvelope<'a, E> {
    pub event: &'a E,
    pub metadata: &'a Metadata,
}

impl<'a, E> OutboxEnvelope<'a, E> {
    pub fn new(event: &'a E, metadata: &'a Metadata) -> Self {
        Self { event, metadata }
    }
}

impl<E: Serialize> OutboxEnvelope<'_, E> {
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
