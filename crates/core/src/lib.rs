//! DENFIT Core - Shared types library.
//!
//! This crate provides common types used across all DENFIT components:
//! - `server` - REST backend (products, orders, auth, transactional email)
//! - `client` - Browser-side application core (session, cart, checkout)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, currencies, and
//!   order statuses
//! - [`models`] - Wire-format domain records shared by the client and server

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
