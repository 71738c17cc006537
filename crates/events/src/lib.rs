//! Domain event abstractions and the outbox envelope.

pub mod envelope;
pub mod event;
pub mod metadata;

pub use envelope::OutboxEnvelope;
pub use event::Event;
pub use metadata::{Metadata, MetadataValue};
