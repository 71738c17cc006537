//! Domain foundation: ids, exact money, periods, clocks and the error taxonomy.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod id;
pub mod money;
pub mod period;

pub use aggregate::AggregateRoot;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Classify, ErrorKind};
pub use id::{EventId, ParseIdError, ProductId};
pub use money::{Money, MoneyError};
pub use period::{InvalidPeriod, Period};

pub use num_bigint::BigInt;
pub use num_rational::BigRational;
