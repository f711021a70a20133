//! HTTP transport for the panel REST API

mod client;

pub use client::PanelClient;
