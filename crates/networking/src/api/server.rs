//! Server-scoped API operations

use crate::{PanelClient, TicketFetcher};
use async_trait::async_trait;
use panel_core::{ConnectionTicket, Error, Result, ServerId, ServerInfo};
use tracing::warn;

#[async_trait]
impl TicketFetcher for PanelClient {
    async fn fetch_ticket(&self, server_id: &ServerId) -> Result<ConnectionTicket> {
        let ticket = self.get_websocket_ticket(server_id).await?;
        if ticket.socket_url.is_empty() || ticket.auth_token.is_empty() {
            warn!("Panel returned an incomplete socket ticket for {}", server_id);
            return Err(Error::InvalidData("socket ticket is missing url or token".to_string()));
        }
        Ok(ticket)
    }
}

/// Fetch the server summary shown beside the live status
pub async fn fetch_server_info(client: &PanelClient, server_id: &ServerId) -> Result<ServerInfo> {
    client.get_server(server_id).await
}
