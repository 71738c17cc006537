use chrono::{DateTime, Utc};

/// A fact recorded by an aggregate and published through the outbox.
///
/// Each aggregate declares one closed sum type implementing this trait, so
/// consumers can match its variants exhaustively.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Wire tag, e.g. "product.created". Also stored as the outbox `event_type`.
    fn event_type(&self) -> &'static str;

    /// Text form of the producing aggregate's id (the outbox `aggregate_id`).
    fn aggregate_id(&self) -> String;

    /// Business time of the transition that recorded the event.
    fn occurred_at(&self) -> DateTime<Utc>;
}
