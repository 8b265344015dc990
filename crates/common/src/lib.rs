//! Shared types for the product catalog workspace.

pub mod clock;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use types::ProductId;
