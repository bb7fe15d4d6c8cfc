//! Core types and contract-alerting logic for the `lsw` Leaseweb CLI.
//!
//! This crate has no HTTP or filesystem dependencies. The
//! API backend and notification channels are reached through the
//! [`api::ServerApi`] and [`notify::Notifier`] traits; concrete
//! implementations live in `lsw-cli`.

pub mod alert;
pub mod api;
pub mod check;
pub mod duration;
pub mod error;
pub mod notify;
pub mod page;
pub mod period;
pub mod server;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
