//! Service layer: authentication and email dispatch.

pub mod auth;
pub mod mail;
