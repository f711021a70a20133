//! Data models for panel API payloads and socket frames

mod admin;
mod frame;
mod node;
mod server;
mod support;
mod ticket;
mod user;

pub use admin::*;
pub use frame::*;
pub use node::*;
pub use server::*;
pub use support::*;
pub use ticket::*;
pub use user::*;
