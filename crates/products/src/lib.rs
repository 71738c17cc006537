//! Product aggregate: state machine, dirty tracking, discounts and events.

pub mod change_tracker;
pub mod discount;
pub mod error;
pub mod events;
pub mod product;

pub use change_tracker::{ChangeTracker, Field};
pub use discount::{Discount, Percentage};
pub use error::{PeriodProblem, ProductError};
pub use events::ProductEvent;
pub use product::{
    DEFAULT_CATEGORY, NewProduct, ParseStatusError, Product, ProductSnapshot, ProductStatus,
    ProductUpdate,
};
