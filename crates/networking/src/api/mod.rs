//! High-level API wrappers for panel endpoints
//!
//! This module provides convenient wrappers around the raw HTTP client,
//! including the [`TicketFetcher`](crate::TicketFetcher) implementation
//! that lets a `PanelClient` feed the connection manager.

mod server;
mod user;

pub use server::*;
pub use user::*;
