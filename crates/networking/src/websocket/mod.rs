//! Live server-status socket
//!
//! The [`ConnectionManager`] owns one status socket per opened server,
//! recovering from drops with a bounded, flat-delay reconnect policy.
//! Ticket acquisition and socket transport are injected through the
//! [`TicketFetcher`] and [`SocketConnector`] traits.

mod manager;
mod socket;

pub use manager::{ConnectionManager, ManagerConfig, ManagerEvent, MAX_RETRIES, RETRY_DELAY};
pub use socket::{SocketConnector, SocketEvent, StatusSocket, TungsteniteConnector, TungsteniteSocket};

use async_trait::async_trait;
use panel_core::{ConnectionTicket, Result, ServerId};
use std::fmt;
use std::sync::Arc;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Authenticating,
    Live,
    Closed,
    Reconnecting,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Authenticating => "authenticating",
            ConnectionState::Live => "live",
            ConnectionState::Closed => "closed",
            ConnectionState::Reconnecting => "reconnecting",
        }
    }

    /// An attempt is in flight, established, or waiting to retry
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting
                | ConnectionState::Authenticating
                | ConnectionState::Live
                | ConnectionState::Reconnecting
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of one-time socket tickets
#[async_trait]
pub trait TicketFetcher: Send + Sync + 'static {
    async fn fetch_ticket(&self, server_id: &ServerId) -> Result<ConnectionTicket>;
}

#[async_trait]
impl<T: TicketFetcher> TicketFetcher for Arc<T> {
    async fn fetch_ticket(&self, server_id: &ServerId) -> Result<ConnectionTicket> {
        (**self).fetch_ticket(server_id).await
    }
}
