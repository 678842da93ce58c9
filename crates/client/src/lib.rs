//! DENFIT Client - Browser-side application core.
//!
//! This crate is the stateful heart of the single-page storefront, kept free
//! of any rendering concerns. It holds:
//!
//! - [`api`] - Typed HTTP client for the DENFIT REST backend
//! - [`storage`] - Durable key-value storage abstraction (the localStorage
//!   analogue) used to persist the session across restarts
//! - [`session`] - Auth token + user profile store
//! - [`cart`] - Cart and wishlist stores (line items keyed by
//!   product/size/color)
//! - [`catalog`] - Read-only product catalog fetched once at startup
//! - [`checkout`] - The checkout orchestrator state machine and local order
//!   history
//! - [`notify`] - Toast notification sink
//! - [`state`] - The explicit [`AppState`](state::AppState) struct composing
//!   all of the above
//!
//! # Concurrency model
//!
//! The client is single-threaded and cooperative: every store mutation is a
//! synchronous `&mut self` call that runs to completion before the next event
//! is processed. Network calls are the only suspension points, and the
//! checkout flow guards against duplicate in-flight submissions.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod notify;
pub mod session;
pub mod state;
pub mod storage;

pub use api::{ApiClient, ApiError, Backend};
pub use state::AppState;
