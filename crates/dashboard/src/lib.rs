//! Panel Dashboard - background pollers and status presentation helpers

pub mod badge;
pub mod listing;
pub mod poller;

pub use badge::StatusBadge;
pub use listing::{
    filter_nodes, paginate, Page, TicketFilter, NODES_PER_PAGE, TICKETS_PER_PAGE,
};
pub use poller::{spawn_dashboard_poller, DashboardApi, DashboardHandle, PollerConfig};
