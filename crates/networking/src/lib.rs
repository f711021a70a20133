//! Panel Networking - HTTP client, live status socket, and API wrappers

pub mod api;
pub mod http;
pub mod websocket;

pub use http::PanelClient;
pub use websocket::{
    ConnectionManager, ConnectionState, ManagerConfig, ManagerEvent, SocketConnector,
    SocketEvent, StatusSocket, TicketFetcher, TungsteniteConnector,
};
