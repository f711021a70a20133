//! Command-line and environment configuration

use clap::{Parser, Subcommand};
use panel_core::{PowerAction, TicketPriority, TicketStatus};
use panel_dashboard::PollerConfig;
use panel_networking::ManagerConfig;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "panel", version, about = "Live status client for the hosting panel")]
pub struct Cli {
    /// Panel origin, e.g. https://panel.example.net
    #[arg(long, env = "PANEL_BASE_URL")]
    pub base_url: String,

    /// Session cookie as `name=value`
    #[arg(long, env = "PANEL_SESSION", hide_env_values = true)]
    pub session: Option<String>,

    /// Reconnect attempts after the socket drops
    #[arg(long, env = "PANEL_MAX_RETRIES", default_value_t = panel_networking::websocket::MAX_RETRIES)]
    pub max_retries: u32,

    /// Delay between reconnect attempts, in milliseconds
    #[arg(long, env = "PANEL_RETRY_DELAY_MS", default_value_t = 5000)]
    pub retry_delay_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Follow a server's live status until interrupted
    Watch {
        server_id: String,

        /// Power action to send once the socket is live (start, restart, stop)
        #[arg(long)]
        power: Option<PowerAction>,
    },
    /// Print the account and server summary
    Summary {
        server_id: Option<String>,

        /// Seconds to wait for the first reads
        #[arg(long, default_value_t = 3)]
        wait_secs: u64,
    },
    /// End the panel session
    Logout,
    /// List support desk tickets (admin)
    Tickets {
        /// Match subject or author
        #[arg(long, default_value = "")]
        search: String,

        #[arg(long)]
        priority: Option<TicketPriority>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        status: Option<TicketStatus>,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// List panel nodes (admin)
    Nodes {
        /// Match name or FQDN
        #[arg(long, default_value = "")]
        search: String,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Print panel-wide totals and reboot state (admin)
    Overview,
}

impl Cli {
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            ..ManagerConfig::default()
        }
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig::default()
    }
}
