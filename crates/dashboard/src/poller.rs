//! Dashboard poller — periodic REST reads beside the live socket
//!
//! Keeps the admin flag, coin balance, user info, and server summary
//! fresh. Each read runs on its own task; failures fall back to a
//! neutral value instead of surfacing an error, so the dashboard always
//! has something to render. None of this touches the connection manager.

use async_trait::async_trait;
use panel_core::{Result, ServerId, ServerInfo, UserInfo};
use panel_networking::{api, PanelClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info};

/// How often the admin flag is re-checked
const ADMIN_INTERVAL_SECS: u64 = 30;

/// How often the coin balance is refreshed
const COINS_INTERVAL_SECS: u64 = 3;

/// Poll intervals
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub admin_interval: Duration,
    pub coins_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            admin_interval: Duration::from_secs(ADMIN_INTERVAL_SECS),
            coins_interval: Duration::from_secs(COINS_INTERVAL_SECS),
        }
    }
}

/// REST reads the dashboard depends on
#[async_trait]
pub trait DashboardApi: Send + Sync + 'static {
    async fn is_admin(&self) -> Result<bool>;
    async fn user(&self) -> Result<UserInfo>;
    async fn coins(&self) -> Result<f64>;
    async fn server(&self, server_id: &ServerId) -> Result<ServerInfo>;
}

#[async_trait]
impl DashboardApi for PanelClient {
    async fn is_admin(&self) -> Result<bool> {
        api::is_admin(self).await
    }

    async fn user(&self) -> Result<UserInfo> {
        api::fetch_user(self).await
    }

    async fn coins(&self) -> Result<f64> {
        api::coin_balance(self).await
    }

    async fn server(&self, server_id: &ServerId) -> Result<ServerInfo> {
        api::fetch_server_info(self, server_id).await
    }
}

#[async_trait]
impl<T: DashboardApi> DashboardApi for Arc<T> {
    async fn is_admin(&self) -> Result<bool> {
        (**self).is_admin().await
    }

    async fn user(&self) -> Result<UserInfo> {
        (**self).user().await
    }

    async fn coins(&self) -> Result<f64> {
        (**self).coins().await
    }

    async fn server(&self, server_id: &ServerId) -> Result<ServerInfo> {
        (**self).server(server_id).await
    }
}

// ─── Handle ──────────────────────────────────────────────────────────

/// Handle to read the polled values and stop the pollers
///
/// The pollers stop when the last clone of the handle is dropped.
#[derive(Clone)]
pub struct DashboardHandle {
    cancel: CancellationToken,
    _guard: Arc<DropGuard>,
    admin: watch::Receiver<bool>,
    user: watch::Receiver<UserInfo>,
    coins: watch::Receiver<f64>,
    server: watch::Receiver<ServerInfo>,
}

impl DashboardHandle {
    pub fn is_admin(&self) -> bool {
        *self.admin.borrow()
    }

    pub fn user(&self) -> UserInfo {
        self.user.borrow().clone()
    }

    pub fn coins(&self) -> f64 {
        *self.coins.borrow()
    }

    pub fn server(&self) -> ServerInfo {
        self.server.borrow().clone()
    }

    /// Watch the coin balance for changes
    pub fn watch_coins(&self) -> watch::Receiver<f64> {
        self.coins.clone()
    }

    /// Watch the server summary for changes
    pub fn watch_server(&self) -> watch::Receiver<ServerInfo> {
        self.server.clone()
    }

    /// Stop every poller task
    pub fn stop(&self) {
        self.cancel.cancel();
        info!("Dashboard pollers stopped");
    }
}

// ─── Spawn ───────────────────────────────────────────────────────────

/// Spawn the dashboard pollers.
///
/// The user is fetched once, the server summary once for `server_id`
/// (if any), the admin flag and coin balance on their intervals.
pub fn spawn_dashboard_poller<A: DashboardApi>(
    api: Arc<A>,
    server_id: Option<ServerId>,
    config: PollerConfig,
) -> DashboardHandle {
    let cancel = CancellationToken::new();
    let (admin_tx, admin_rx) = watch::channel(false);
    let (user_tx, user_rx) = watch::channel(UserInfo {
        username: String::new(),
        id: String::new(),
    });
    let (coins_tx, coins_rx) = watch::channel(0.0);
    let (server_tx, server_rx) = watch::channel(ServerInfo::default());

    tokio::spawn(admin_loop(
        api.clone(),
        cancel.clone(),
        config.admin_interval,
        admin_tx,
    ));
    tokio::spawn(coins_loop(
        api.clone(),
        cancel.clone(),
        config.coins_interval,
        coins_tx,
    ));

    let user_api = api.clone();
    let user_cancel = cancel.clone();
    tokio::spawn(async move {
        let user = tokio::select! {
            _ = user_cancel.cancelled() => return,
            result = user_api.user() => result,
        };
        match user {
            Ok(user) => {
                debug!("Logged in as {} ({})", user.username, user.id);
                let _ = user_tx.send(user);
            }
            Err(e) => {
                debug!("User fetch failed, using placeholder: {}", e);
                let _ = user_tx.send(UserInfo::fallback());
            }
        }
    });

    if let Some(server_id) = server_id {
        let server_cancel = cancel.clone();
        tokio::spawn(async move {
            let info = tokio::select! {
                _ = server_cancel.cancelled() => return,
                result = api.server(&server_id) => result,
            };
            match info {
                Ok(info) => {
                    let _ = server_tx.send(info);
                }
                Err(e) => error!("Failed to fetch server info for {}: {}", server_id, e),
            }
        });
    }

    DashboardHandle {
        _guard: Arc::new(cancel.clone().drop_guard()),
        cancel,
        admin: admin_rx,
        user: user_rx,
        coins: coins_rx,
        server: server_rx,
    }
}

// ─── Loops ───────────────────────────────────────────────────────────

async fn admin_loop<A: DashboardApi>(
    api: Arc<A>,
    cancel: CancellationToken,
    period: Duration,
    admin_tx: watch::Sender<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Admin poller cancelled, exiting");
                return;
            }
            _ = interval.tick() => {
                let admin = match api.is_admin().await {
                    Ok(admin) => admin,
                    Err(e) => {
                        debug!("Admin check failed: {}", e);
                        false
                    }
                };
                admin_tx.send_if_modified(|current| {
                    let changed = *current != admin;
                    *current = admin;
                    changed
                });
            }
        }
    }
}

async fn coins_loop<A: DashboardApi>(
    api: Arc<A>,
    cancel: CancellationToken,
    period: Duration,
    coins_tx: watch::Sender<f64>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Coin poller cancelled, exiting");
                return;
            }
            _ = interval.tick() => {
                let coins = match api.coins().await {
                    Ok(coins) => coins,
                    Err(e) => {
                        debug!("Coin balance fetch failed: {}", e);
                        0.0
                    }
                };
                coins_tx.send_if_modified(|current| {
                    let changed = *current != coins;
                    *current = coins;
                    changed
                });
            }
        }
    }
}
