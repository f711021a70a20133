//! Panel CLI - Main entry point

mod config;

use anyhow::{bail, Context};
use clap::Parser;
use config::{Cli, Command};
use panel_core::{PowerAction, ServerId};
use panel_dashboard::{
    filter_nodes, paginate, spawn_dashboard_poller, StatusBadge, TicketFilter, NODES_PER_PAGE,
    TICKETS_PER_PAGE,
};
use panel_networking::{
    api, ConnectionManager, ConnectionState, ManagerEvent, PanelClient, TungsteniteConnector,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "panel=info,panel_networking=info,panel_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let client = Arc::new(
        PanelClient::new(&cli.base_url, cli.session.as_deref())
            .context("failed to create panel client")?,
    );

    match &cli.command {
        Command::Watch { server_id, power } => {
            watch(&cli, client, ServerId::new(server_id.as_str()), *power).await
        }
        Command::Summary {
            server_id,
            wait_secs,
        } => {
            summary(
                &cli,
                client,
                server_id.as_deref().map(ServerId::from),
                Duration::from_secs(*wait_secs),
            )
            .await
        }
        Command::Logout => {
            api::logout(&client).await.context("logout failed")?;
            info!("Logged out");
            Ok(())
        }
        Command::Tickets {
            search,
            priority,
            category,
            status,
            page,
        } => {
            let filter = TicketFilter {
                search: search.clone(),
                priority: *priority,
                category: category.clone(),
                status: *status,
            };
            tickets(&client, filter, *page).await
        }
        Command::Nodes { search, page } => nodes(&client, search, *page).await,
        Command::Overview => overview(&client).await,
    }
}

/// Follow one server's live status until Ctrl-C or the connection gives up
async fn watch(
    cli: &Cli,
    client: Arc<PanelClient>,
    server_id: ServerId,
    mut power: Option<PowerAction>,
) -> anyhow::Result<()> {
    let manager = ConnectionManager::new(client, TungsteniteConnector, cli.manager_config());
    let mut events = manager.subscribe();

    info!("Watching server {}", server_id);
    manager.open(server_id.clone()).await;

    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break Ok(());
            }
            event = events.recv() => match event {
                Ok(ManagerEvent::StateChanged(state)) => {
                    info!("Connection {}", state);
                    match state {
                        ConnectionState::Live => {
                            if let Some(action) = power.take() {
                                if !manager.send_command(action) {
                                    warn!("Could not send {} to server {}", action, server_id);
                                }
                            }
                        }
                        ConnectionState::Idle => {
                            break Err(anyhow::anyhow!("could not obtain a socket ticket for {}", server_id));
                        }
                        ConnectionState::Closed => {
                            error!("Gave up reconnecting to server {}", server_id);
                            break Err(anyhow::anyhow!("connection to {} closed", server_id));
                        }
                        _ => {}
                    }
                }
                Ok(ManagerEvent::StatusChanged(snapshot)) => {
                    let badge = StatusBadge::for_status(&snapshot.status);
                    println!("{} status: {} ({:?})", server_id, snapshot.status, badge);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Skipped {} connection events", skipped);
                }
                Err(RecvError::Closed) => break Ok(()),
            }
        }
    };

    manager.close().await;
    outcome
}

/// Print the polled account and server summary
async fn summary(
    cli: &Cli,
    client: Arc<PanelClient>,
    server_id: Option<ServerId>,
    wait: Duration,
) -> anyhow::Result<()> {
    let handle = spawn_dashboard_poller(client, server_id.clone(), cli.poller_config());
    tokio::time::sleep(wait).await;

    let user = handle.user();
    if user.username.is_empty() {
        handle.stop();
        bail!("no response from the panel within {:?}", wait);
    }

    println!("user:  {} ({})", user.username, user.id);
    println!("admin: {}", handle.is_admin());
    println!("coins: {}", handle.coins());

    if let Some(server_id) = server_id {
        let server = handle.server();
        let address = match (server.ip.as_deref(), server.port.as_deref()) {
            (Some(ip), Some(port)) => format!("{}:{}", ip, port),
            (Some(ip), None) => ip.to_string(),
            _ => "-".to_string(),
        };
        println!(
            "server {}: {} [{}] {}",
            server_id, server.name, server.status, address
        );
    }

    handle.stop();
    Ok(())
}

/// Print one page of the support desk
async fn tickets(client: &PanelClient, filter: TicketFilter, page: usize) -> anyhow::Result<()> {
    let (stats, all) = tokio::try_join!(client.ticket_stats(), client.list_tickets())
        .context("failed to load tickets")?;

    println!(
        "tickets: {} total, {} open, {} last week, avg response {:.1} min",
        stats.total,
        stats.open,
        stats.tickets_last_week,
        stats.average_response_minutes()
    );

    let page = paginate(filter.apply(all), page, TICKETS_PER_PAGE);
    for ticket in &page.items {
        println!(
            "#{:<6} {:<8} {:<6} {:<10} {} ({})",
            ticket.id,
            ticket.priority,
            ticket.status,
            ticket.category,
            ticket.subject,
            ticket.user.username
        );
    }
    println!(
        "page {}/{} ({} matching)",
        page.page, page.total_pages, page.total_items
    );
    Ok(())
}

/// Print one page of the node list
async fn nodes(client: &PanelClient, search: &str, page: usize) -> anyhow::Result<()> {
    let all = client.list_nodes().await.context("failed to load nodes")?;
    let page = paginate(filter_nodes(all, search), page, NODES_PER_PAGE);

    for node in &page.items {
        let location = node
            .location
            .as_ref()
            .map(|l| format!("{}, {}", l.city, l.country))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<16} {:<28} {:>7} MB {:>9} MB  {}",
            node.id, node.name, node.fqdn, node.memory, node.disk, location
        );
    }
    println!(
        "page {}/{} ({} matching)",
        page.page, page.total_pages, page.total_items
    );
    Ok(())
}

/// Print panel-wide totals and whether a reboot is pending
async fn overview(client: &PanelClient) -> anyhow::Result<()> {
    let (counts, reboot, backups) = tokio::try_join!(
        client.system_counts(),
        client.reboot_status(),
        client.list_config_backups()
    )
    .context("failed to load overview")?;

    println!("servers: {}", counts.servers);
    println!("users:   {}", counts.users);
    println!("nodes:   {}", counts.nodes);
    println!("config backups: {}", backups.len());
    if reboot.needs_reboot {
        warn!("Configuration changed; the panel needs a reboot");
    }
    Ok(())
}
