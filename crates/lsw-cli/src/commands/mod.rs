//! Command handlers.

pub mod auth;
pub mod server;
