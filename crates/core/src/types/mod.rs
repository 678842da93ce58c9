//! Core type definitions.
//!
//! Newtype wrappers and small enums shared across the workspace.

pub mod currency;
pub mod email;
pub mod id;
pub mod status;

pub use currency::Currency;
pub use email::{Email, EmailError};
pub use id::{OrderId, ProductId, ReviewId, UserId};
pub use status::OrderStatus;
