//! Socket transport seam and its tokio-tungstenite implementation

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use panel_core::Result;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

/// What the transport reports when it is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// A text payload
    Message(String),
    /// Transport error; a `Closed` follows
    Error(String),
    /// The connection is gone
    Closed,
}

/// An open status socket
///
/// `next_event` must be cancel-safe: it is raced against the outbound
/// queue and the cancellation token.
#[async_trait]
pub trait StatusSocket: Send + 'static {
    async fn send_text(&mut self, text: String) -> Result<()>;

    async fn next_event(&mut self) -> SocketEvent;

    async fn close(&mut self);
}

/// Opens status sockets from ticket URLs
#[async_trait]
pub trait SocketConnector: Send + Sync + 'static {
    type Socket: StatusSocket;

    async fn connect(&self, url: &str) -> Result<Self::Socket>;
}

#[async_trait]
impl<T: SocketConnector> SocketConnector for Arc<T> {
    type Socket = T::Socket;

    async fn connect(&self, url: &str) -> Result<Self::Socket> {
        (**self).connect(url).await
    }
}

/// Connector backed by tokio-tungstenite
#[derive(Debug, Clone, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl SocketConnector for TungsteniteConnector {
    type Socket = TungsteniteSocket;

    async fn connect(&self, url: &str) -> Result<TungsteniteSocket> {
        let (stream, response) = connect_async(url).await?;
        debug!("Socket handshake complete ({})", response.status());
        Ok(TungsteniteSocket {
            stream,
            failed: false,
        })
    }
}

pub struct TungsteniteSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    failed: bool,
}

#[async_trait]
impl StatusSocket for TungsteniteSocket {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn next_event(&mut self) -> SocketEvent {
        // Read errors are fatal in tungstenite, report the close right after
        if self.failed {
            return SocketEvent::Closed;
        }

        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return SocketEvent::Message(text.to_string()),
                Some(Ok(Message::Close(frame))) => {
                    debug!("Socket closed by peer: {:?}", frame);
                    return SocketEvent::Closed;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.failed = true;
                    return SocketEvent::Error(e.to_string());
                }
                None => return SocketEvent::Closed,
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("Socket close handshake failed: {}", e);
        }
    }
}
