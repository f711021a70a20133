//! Panel HTTP client with cookie-based authentication

use panel_core::{
    AdminStatusResponse, ApiErrorBody, CoinsResponse, ConfigBackup, ConnectionTicket, Error,
    ListTotalResponse, NewRadarNode, Node, NodeListResponse, RadarNode, RadarNodeDetail,
    RebootStatus, Result, ServerId, ServerInfo, ServerResponse, SupportTicket, SystemCounts,
    TicketPriority, TicketPriorityUpdate, TicketReply, TicketStats, TicketStatus,
    TicketStatusUpdate, UserInfo, WebsocketTicketResponse,
};
use reqwest::{
    cookie::Jar,
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client, RequestBuilder, Response, Url,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// HTTP client for the panel API
///
/// All requests go to `{base_url}/api/...` and carry the dashboard
/// session cookie, the same way the browser front end does.
pub struct PanelClient {
    http: Client,
    base_url: Url,
}

impl PanelClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Panel origin, e.g. `https://panel.example.net`
    /// * `session_cookie` - Optional `name=value` cookie pair for the logged-in session
    pub fn new(base_url: &str, session_cookie: Option<&str>) -> Result<Self> {
        let base_url: Url = base_url
            .parse()
            .map_err(|e| Error::ConfigError(format!("invalid base URL {}: {}", base_url, e)))?;

        let jar = Arc::new(Jar::default());
        if let Some(cookie) = session_cookie {
            jar.add_cookie_str(cookie, &base_url);
        }

        let http = Client::builder()
            .cookie_provider(jar)
            .default_headers(Self::default_headers())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Resolve an API path against the base URL
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::ConfigError(format!("invalid endpoint {}: {}", path, e)))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check if response indicates authentication failure
    fn check_auth_error(response: &Response) -> Option<Error> {
        match response.status().as_u16() {
            401 => Some(Error::TokenExpired),
            403 => Some(Error::AuthenticationError("Access forbidden".to_string())),
            _ => None,
        }
    }

    /// Send a request, mapping auth failures and non-2xx codes
    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response> {
        let response = request.send().await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = ApiErrorBody::message_from(&body);
            error!("Request to {} failed: HTTP {} {}", path, status, message);
            return Err(Error::ApiError(format!("HTTP {}: {}", status, message)));
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse response from {}: {}", path, e);
            Error::InvalidData(e.to_string())
        })
    }

    /// GET a JSON document
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let response = self.send(self.http.get(url), path).await?;
        Self::read_json(response, path).await
    }

    /// GET a plain-text document
    async fn get_text(&self, path: &str) -> Result<String> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let response = self.send(self.http.get(url), path).await?;
        Ok(response.text().await?)
    }

    /// POST without a body, ignoring the response body
    async fn post_empty(&self, path: &str) -> Result<()> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        self.send(self.http.post(url), path).await?;
        Ok(())
    }

    /// POST a JSON body, ignoring the response body
    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        self.send(self.http.post(url).json(body), path).await?;
        Ok(())
    }

    /// PATCH a JSON body, ignoring the response body
    async fn patch_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.endpoint(path)?;
        debug!("PATCH {}", url);
        self.send(self.http.patch(url).json(body), path).await?;
        Ok(())
    }

    /// Exchange a server id for a one-time socket URL and auth token
    #[instrument(skip(self, server_id), fields(server_id = %server_id))]
    pub async fn get_websocket_ticket(&self, server_id: &ServerId) -> Result<ConnectionTicket> {
        let path = format!("/api/server/{}/websocket", server_id);
        let envelope: WebsocketTicketResponse = self.get_json(&path).await?;
        let ticket = envelope.into_ticket();
        debug!("Socket ticket issued for {}", ticket.socket_url);
        Ok(ticket)
    }

    /// Whether the logged-in user has panel admin rights
    #[instrument(skip(self))]
    pub async fn get_admin_status(&self) -> Result<bool> {
        let resp: AdminStatusResponse = self.get_json("/api/admin").await?;
        Ok(resp.admin)
    }

    /// Fetch the logged-in user's name and id
    #[instrument(skip(self))]
    pub async fn get_user(&self) -> Result<UserInfo> {
        self.get_json("/api/user").await
    }

    /// Fetch the user's coin balance
    #[instrument(skip(self))]
    pub async fn get_coins(&self) -> Result<f64> {
        let resp: CoinsResponse = self.get_json("/api/coins").await?;
        Ok(resp.coins)
    }

    /// Fetch the server summary (name, status, primary allocation)
    #[instrument(skip(self, server_id), fields(server_id = %server_id))]
    pub async fn get_server(&self, server_id: &ServerId) -> Result<ServerInfo> {
        let path = format!("/api/server/{}", server_id);
        let resp: ServerResponse = self.get_json(&path).await?;
        let info = resp.into_server_info();
        debug!("Server {} is {} ({})", server_id, info.name, info.status);
        Ok(info)
    }

    /// End the dashboard session
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.post_empty("/api/user/logout").await?;
        debug!("Session logged out");
        Ok(())
    }

    // ─── Support desk ────────────────────────────────────────────────

    /// Every ticket on the desk
    #[instrument(skip(self))]
    pub async fn list_tickets(&self) -> Result<Vec<SupportTicket>> {
        self.get_json("/api/tickets/all").await
    }

    #[instrument(skip(self))]
    pub async fn ticket_stats(&self) -> Result<TicketStats> {
        self.get_json("/api/tickets/stats").await
    }

    /// One ticket with its full message thread
    #[instrument(skip(self))]
    pub async fn get_ticket(&self, ticket_id: &str) -> Result<SupportTicket> {
        self.get_json(&format!("/api/tickets/{}", ticket_id)).await
    }

    /// Post a staff reply to a ticket thread
    #[instrument(skip(self, content))]
    pub async fn reply_to_ticket(&self, ticket_id: &str, content: &str) -> Result<()> {
        let path = format!("/api/tickets/{}/messages", ticket_id);
        self.post_json(&path, &TicketReply { content }).await
    }

    #[instrument(skip(self))]
    pub async fn set_ticket_status(&self, ticket_id: &str, status: TicketStatus) -> Result<()> {
        let path = format!("/api/tickets/{}/status", ticket_id);
        self.patch_json(&path, &TicketStatusUpdate { status }).await?;
        info!("Ticket {} marked {}", ticket_id, status);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_ticket_priority(
        &self,
        ticket_id: &str,
        priority: TicketPriority,
    ) -> Result<()> {
        let path = format!("/api/tickets/{}/priority", ticket_id);
        self.patch_json(&path, &TicketPriorityUpdate { priority }).await?;
        info!("Ticket {} priority set to {}", ticket_id, priority);
        Ok(())
    }

    /// The whole desk as CSV
    #[instrument(skip(self))]
    pub async fn export_tickets(&self) -> Result<String> {
        self.get_text("/api/tickets/export").await
    }

    // ─── Nodes and radar ─────────────────────────────────────────────

    #[instrument(skip(self))]
    pub async fn list_nodes(&self) -> Result<Vec<Node>> {
        let resp: NodeListResponse = self.get_json("/api/nodes").await?;
        Ok(resp.into_nodes())
    }

    /// Wings configuration document for one node
    #[instrument(skip(self))]
    pub async fn node_configuration(&self, node_id: &str) -> Result<serde_json::Value> {
        self.get_json(&format!("/api/nodes/{}/configuration", node_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_radar_nodes(&self) -> Result<Vec<RadarNode>> {
        self.get_json("/api/radar/nodes").await
    }

    /// Live detection stats for one radar node
    #[instrument(skip(self))]
    pub async fn radar_node(&self, node_id: &str) -> Result<RadarNodeDetail> {
        self.get_json(&format!("/api/radar/nodes/{}", node_id)).await
    }

    /// Deploy a new radar node
    #[instrument(skip(self, node), fields(name = %node.name))]
    pub async fn create_radar_node(&self, node: &NewRadarNode) -> Result<()> {
        self.post_json("/api/radar/nodes", node).await?;
        info!("Radar node {} deployed", node.name);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_radar_node(&self, node_id: &str) -> Result<()> {
        let path = format!("/api/radar/nodes/{}", node_id);
        let url = self.endpoint(&path)?;
        debug!("DELETE {}", url);
        self.send(self.http.delete(url), &path).await?;
        info!("Radar node {} removed", node_id);
        Ok(())
    }

    // ─── Panel overview ──────────────────────────────────────────────

    /// Server, user, and node totals, read in parallel
    #[instrument(skip(self))]
    pub async fn system_counts(&self) -> Result<SystemCounts> {
        let (servers, users, nodes) = tokio::try_join!(
            self.get_json::<ListTotalResponse>("/api/servers"),
            self.get_json::<ListTotalResponse>("/api/users"),
            self.get_json::<ListTotalResponse>("/api/nodes"),
        )?;
        Ok(SystemCounts {
            servers: servers.meta.total(),
            users: users.meta.total(),
            nodes: nodes.meta.total(),
        })
    }

    #[instrument(skip(self))]
    pub async fn list_config_backups(&self) -> Result<Vec<ConfigBackup>> {
        self.get_json("/api/config/backups").await
    }

    /// Content of one stored backup
    #[instrument(skip(self))]
    pub async fn config_backup(&self, name: &str) -> Result<String> {
        self.get_text(&format!("/api/config/backups/{}", name)).await
    }

    #[instrument(skip(self))]
    pub async fn restore_config_backup(&self, name: &str) -> Result<()> {
        self.post_empty(&format!("/api/config/backups/{}/restore", name))
            .await?;
        info!("Config restored from backup {}", name);
        Ok(())
    }

    /// Parsed panel configuration
    #[instrument(skip(self))]
    pub async fn get_config(&self) -> Result<serde_json::Value> {
        self.get_json("/api/config").await
    }

    /// Panel configuration file as stored on disk
    #[instrument(skip(self))]
    pub async fn get_raw_config(&self) -> Result<String> {
        self.get_text("/api/config/raw").await
    }

    /// Replace the panel configuration file
    #[instrument(skip(self, content))]
    pub async fn save_raw_config(&self, content: String) -> Result<()> {
        let path = "/api/config/raw";
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .body(content);
        self.send(request, path).await?;
        info!("Panel configuration saved");
        Ok(())
    }

    /// Restart the panel process
    #[instrument(skip(self))]
    pub async fn reboot(&self) -> Result<()> {
        self.post_empty("/api/reboot").await?;
        info!("Panel reboot requested");
        Ok(())
    }

    /// Whether a saved config is waiting on a reboot
    #[instrument(skip(self))]
    pub async fn reboot_status(&self) -> Result<RebootStatus> {
        self.get_json("/api/reboot/status").await
    }
}
