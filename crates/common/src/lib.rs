//! Shared types for the order service.

mod types;

pub use types::{Money, UserId};
