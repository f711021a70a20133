//! Connection manager for the live status socket
//!
//! One driver task runs per `open()`. It fetches a ticket, connects,
//! authenticates, dispatches inbound frames, and on an unexpected close
//! schedules a reconnect after a fixed delay until the retry budget is
//! spent. Every continuation checks the attempt's generation before
//! touching shared state, so a superseded or closed attempt can never
//! publish late results.

use super::{ConnectionState, SocketConnector, SocketEvent, StatusSocket, TicketFetcher};
use panel_core::{ConnectionTicket, Frame, InboundEvent, PowerAction, ServerId, StatusSnapshot};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Reconnect attempts allowed after an unexpected close
pub const MAX_RETRIES: u32 = 5;

/// Delay before each reconnect attempt
pub const RETRY_DELAY: Duration = Duration::from_millis(5000);

const EVENT_CAPACITY: usize = 64;

/// Tunables for the connection manager
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// Outbound command queue depth while live
    pub command_buffer: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            retry_delay: RETRY_DELAY,
            command_buffer: 16,
        }
    }
}

/// Notifications published to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerEvent {
    StateChanged(ConnectionState),
    StatusChanged(StatusSnapshot),
}

struct Inner {
    /// Bumped by every open/close; attempts carrying an older value are dead
    generation: u64,
    server_id: Option<ServerId>,
    state: ConnectionState,
    retry_count: u32,
    status: StatusSnapshot,
    outbound: Option<mpsc::Sender<Frame>>,
}

struct Shared {
    inner: Mutex<Inner>,
    events: broadcast::Sender<ManagerEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State stays consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, event: ManagerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn set_state(&self, inner: &mut Inner, state: ConnectionState) {
        if inner.state != state {
            debug!("Connection state {} -> {}", inner.state, state);
            inner.state = state;
            self.publish(ManagerEvent::StateChanged(state));
        }
    }
}

struct Driver {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Driver {
    /// Cancel the attempt and wait until its socket is closed
    async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            if e.is_panic() {
                error!("Connection driver panicked: {}", e);
            }
        }
    }
}

/// Maintains a single live status connection for the selected server
pub struct ConnectionManager<F: TicketFetcher, C: SocketConnector> {
    fetcher: Arc<F>,
    connector: Arc<C>,
    config: ManagerConfig,
    shared: Arc<Shared>,
    driver: tokio::sync::Mutex<Option<Driver>>,
}

impl<F: TicketFetcher, C: SocketConnector> ConnectionManager<F, C> {
    pub fn new(fetcher: F, connector: C, config: ManagerConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            fetcher: Arc::new(fetcher),
            connector: Arc::new(connector),
            config,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    generation: 0,
                    server_id: None,
                    state: ConnectionState::Idle,
                    retry_count: 0,
                    status: StatusSnapshot::default(),
                    outbound: None,
                }),
                events,
            }),
            driver: tokio::sync::Mutex::new(None),
        }
    }

    /// Start (or keep) the live connection for `server_id`
    ///
    /// A no-op while an attempt for the same server is in flight, live,
    /// or waiting to reconnect. Any connection for another server is torn
    /// down before the new attempt starts.
    pub async fn open(&self, server_id: ServerId) {
        let mut driver = self.driver.lock().await;

        {
            let inner = self.shared.lock();
            if driver.is_some()
                && inner.state.is_active()
                && inner.server_id.as_ref() == Some(&server_id)
            {
                debug!("Connection for server {} already open", server_id);
                return;
            }
        }

        if let Some(previous) = driver.take() {
            previous.stop().await;
        }

        let generation = {
            let mut inner = self.shared.lock();
            inner.generation += 1;
            if inner.server_id.as_ref() != Some(&server_id)
                && inner.status != StatusSnapshot::default()
            {
                // The previous server's status does not describe this one
                inner.status = StatusSnapshot::default();
                self.shared
                    .publish(ManagerEvent::StatusChanged(inner.status.clone()));
            }
            inner.server_id = Some(server_id.clone());
            inner.retry_count = 0;
            inner.outbound = None;
            inner.generation
        };

        info!("Opening live status connection for server {}", server_id);

        let cancel = CancellationToken::new();
        let attempt = Attempt {
            generation,
            server_id,
            fetcher: self.fetcher.clone(),
            connector: self.connector.clone(),
            config: self.config.clone(),
            shared: self.shared.clone(),
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(attempt.run());

        *driver = Some(Driver { cancel, task });
    }

    /// Tear down the connection and any pending reconnect
    ///
    /// Safe to call repeatedly; later calls do nothing.
    pub async fn close(&self) {
        let mut driver = self.driver.lock().await;

        if let Some(previous) = driver.take() {
            previous.stop().await;
        }

        let mut inner = self.shared.lock();
        inner.generation += 1;
        inner.outbound = None;
        inner.retry_count = 0;
        if inner.state != ConnectionState::Closed {
            info!("Live status connection closed");
            self.shared.set_state(&mut inner, ConnectionState::Closed);
        }
    }

    /// Send a power action over the live socket
    ///
    /// Best-effort: silently dropped unless the connection is live.
    /// Returns whether the command was queued.
    pub fn send_command(&self, action: PowerAction) -> bool {
        let inner = self.shared.lock();
        if inner.state != ConnectionState::Live {
            debug!("Ignoring {} command while {}", action, inner.state);
            return false;
        }

        match inner.outbound.as_ref() {
            Some(tx) => match tx.try_send(Frame::set_state(action)) {
                Ok(()) => {
                    info!("Queued power action: {}", action);
                    true
                }
                Err(e) => {
                    warn!("Dropping {} command: {}", action, e);
                    false
                }
            },
            None => false,
        }
    }

    /// Subscribe to state and status notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ManagerEvent> {
        self.shared.events.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.lock().state
    }

    pub fn status(&self) -> StatusSnapshot {
        self.shared.lock().status.clone()
    }

    pub fn retry_count(&self) -> u32 {
        self.shared.lock().retry_count
    }

    pub fn server_id(&self) -> Option<ServerId> {
        self.shared.lock().server_id.clone()
    }
}

impl<F: TicketFetcher, C: SocketConnector> Drop for ConnectionManager<F, C> {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.get_mut().as_ref() {
            driver.cancel.cancel();
        }
    }
}

/// How a socket session ended
enum SessionEnd {
    /// Torn down by the caller or superseded
    Cancelled,
    /// Lost without being asked to
    Dropped,
}

/// One driver task's view of the manager
struct Attempt<F, C> {
    generation: u64,
    server_id: ServerId,
    fetcher: Arc<F>,
    connector: Arc<C>,
    config: ManagerConfig,
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

impl<F: TicketFetcher, C: SocketConnector> Attempt<F, C> {
    async fn run(self) {
        loop {
            if !self.transition(ConnectionState::Connecting) {
                return;
            }

            let ticket = tokio::select! {
                _ = self.cancel.cancelled() => return,
                result = self.fetcher.fetch_ticket(&self.server_id) => result,
            };

            let ticket = match ticket {
                Ok(ticket) => ticket,
                Err(e) => {
                    // Ticket failures are terminal for this open()
                    error!("Failed to obtain socket ticket for server {}: {}", self.server_id, e);
                    self.transition(ConnectionState::Idle);
                    return;
                }
            };

            if !self.is_current() {
                return;
            }

            let connected = tokio::select! {
                _ = self.cancel.cancelled() => return,
                result = self.connector.connect(&ticket.socket_url) => result,
            };

            let end = match connected {
                Ok(socket) => self.session(socket, &ticket).await,
                Err(e) => {
                    warn!("Socket connection to {} failed: {}", ticket.socket_url, e);
                    SessionEnd::Dropped
                }
            };

            if let SessionEnd::Cancelled = end {
                return;
            }

            let Some(attempt) = self.schedule_retry() else {
                return;
            };

            info!(
                "Reconnecting in {:?} (attempt {}/{})",
                self.config.retry_delay, attempt, self.config.max_retries
            );

            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(self.config.retry_delay) => {}
            }
        }
    }

    /// Drive one connected socket until it closes or the attempt is cancelled
    async fn session(&self, mut socket: C::Socket, ticket: &ConnectionTicket) -> SessionEnd {
        if !self.transition(ConnectionState::Authenticating) {
            socket.close().await;
            return SessionEnd::Cancelled;
        }

        debug!("Socket open, authenticating");
        send_frame(&mut socket, &Frame::auth(&ticket.auth_token)).await;

        let (tx, mut rx) = mpsc::channel(self.config.command_buffer.max(1));

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    socket.close().await;
                    return SessionEnd::Cancelled;
                }
                event = socket.next_event() => match event {
                    SocketEvent::Message(text) => {
                        if !self.is_current() {
                            socket.close().await;
                            return SessionEnd::Cancelled;
                        }
                        if let Some(reply) = self.dispatch(&text, &tx) {
                            send_frame(&mut socket, &reply).await;
                        }
                    }
                    SocketEvent::Error(e) => {
                        warn!("Socket error: {}", e);
                    }
                    SocketEvent::Closed => {
                        debug!("Socket closed");
                        self.shared.lock().outbound = None;
                        return SessionEnd::Dropped;
                    }
                },
                Some(frame) = rx.recv() => {
                    send_frame(&mut socket, &frame).await;
                }
            }
        }
    }

    /// Apply one inbound message; returns a frame to send back, if any
    fn dispatch(&self, text: &str, outbound: &mpsc::Sender<Frame>) -> Option<Frame> {
        let frame = match Frame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Ignoring malformed socket message: {}", e);
                return None;
            }
        };

        let event = match frame.into_inbound() {
            Ok(event) => event,
            Err(e) => {
                warn!("Ignoring socket event: {}", e);
                return None;
            }
        };

        let mut inner = self.shared.lock();
        if inner.generation != self.generation {
            return None;
        }

        match event {
            InboundEvent::AuthSuccess => {
                info!("Socket authenticated for server {}", self.server_id);
                inner.retry_count = 0;
                inner.outbound = Some(outbound.clone());
                self.shared.set_state(&mut inner, ConnectionState::Live);
                Some(Frame::send_stats())
            }
            InboundEvent::Status(status) => {
                debug!("Server {} status: {}", self.server_id, status);
                inner.status = StatusSnapshot::new(status);
                self.shared
                    .publish(ManagerEvent::StatusChanged(inner.status.clone()));
                None
            }
            InboundEvent::Other(kind) => {
                debug!("Unhandled socket event: {}", kind);
                None
            }
        }
    }

    /// After an unexpected close: either enter `Reconnecting` (returning the
    /// attempt number) or settle in `Closed` once the budget is spent
    fn schedule_retry(&self) -> Option<u32> {
        let mut inner = self.shared.lock();
        if inner.generation != self.generation || self.cancel.is_cancelled() {
            return None;
        }

        inner.outbound = None;
        if inner.retry_count < self.config.max_retries {
            inner.retry_count += 1;
            self.shared.set_state(&mut inner, ConnectionState::Reconnecting);
            Some(inner.retry_count)
        } else {
            warn!(
                "Giving up on server {} after {} reconnect attempts",
                self.server_id, inner.retry_count
            );
            self.shared.set_state(&mut inner, ConnectionState::Closed);
            None
        }
    }

    fn is_current(&self) -> bool {
        !self.cancel.is_cancelled() && self.shared.lock().generation == self.generation
    }

    /// Move to `state` if this attempt is still current
    fn transition(&self, state: ConnectionState) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let mut inner = self.shared.lock();
        if inner.generation != self.generation {
            return false;
        }
        self.shared.set_state(&mut inner, state);
        true
    }
}

async fn send_frame<S: StatusSocket>(socket: &mut S, frame: &Frame) {
    let text = match frame.to_json() {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to encode {} frame: {}", frame.event, e);
            return;
        }
    };
    if let Err(e) = socket.send_text(text).await {
        warn!("Failed to send {} frame: {}", frame.event, e);
    }
}
