//! Raw TCP listener/multiplexer with per-client state.
//!
//! One [`TcpMultiplexer`] owns at most one active listener. `listen` has
//! toggle semantics: starting while a listener is active stops it instead
//! of stacking a second one. The listener runs as a single spawned task
//! owned by the multiplexer (never a process-wide scope) and spawns one
//! connection task per accepted socket; all I/O waits happen inside those
//! tasks, so the caller-facing `listen`/`stop_listening`/`send` operations
//! never block on the network.
//!
//! The multiplexer is a raw byte/text pipe: it imposes no payload framing,
//! and each read drain is recorded as one message. Callers needing real
//! message boundaries must frame on top (the codec crate's bitmap framing,
//! for instance). Listener state transitions are published through a
//! `watch` channel; inbound text is additionally fanned out on a
//! `broadcast` channel for display or decoding.

mod client;
mod error;

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use bytes::BytesMut;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream, tcp::OwnedWriteHalf},
    sync::{RwLock, broadcast, watch},
    task::JoinHandle,
};

pub use client::{Client, Message, Origin};
pub use error::ServerError;

/// Size of each client's read scratch buffer.
const READ_BUFFER_BYTES: usize = 1024;

/// Capacity of the inbound-text broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Listener lifecycle state.
///
/// `Closed -> Listening -> Closed`, with `Error` reachable from a failed
/// bind attempt (no loop is started in that case).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListenState {
    /// No listener is active.
    #[default]
    Closed,
    /// The listener is bound and accepting connections.
    Listening,
    /// The last bind attempt failed, with a human-readable reason.
    Error(String),
}

/// How outbound text is encoded onto the wire, chosen per send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendKind {
    /// Interpret the text as hex digit pairs and send the raw bytes.
    Hex,
    /// Send the text's UTF-8 bytes as-is.
    Text,
}

/// Text received from a peer, fanned out to observers.
#[derive(Debug, Clone)]
pub struct Inbound {
    /// Remote address the text came from.
    pub peer: SocketAddr,
    /// Decoded (lossy UTF-8) text of one read drain.
    pub content: String,
}

/// Shared remote-address-to-client map.
type ClientMap = Arc<RwLock<HashMap<SocketAddr, Arc<Client>>>>;

/// TCP accept/read/write multiplexer.
///
/// Accepts connections on `0.0.0.0:<port>`, keyed by remote address:
/// re-accepting a known address resumes the existing [`Client`] and its
/// message history. Clients are never evicted; disconnects only clear the
/// client's connected flag.
pub struct TcpMultiplexer {
    clients: ClientMap,
    state_tx: watch::Sender<ListenState>,
    events_tx: broadcast::Sender<Inbound>,
    shutdown_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl Default for TcpMultiplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpMultiplexer {
    /// Create a multiplexer in the `Closed` state.
    #[must_use]
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(ListenState::Closed);
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            state_tx,
            events_tx,
            shutdown_tx: None,
            task: None,
            local_addr: None,
        }
    }

    /// Start (or, if already listening, stop) the listener.
    ///
    /// Binds `0.0.0.0:port`. On success the state transitions to
    /// `Listening` and the accept loop starts; on bind failure the state
    /// transitions to `Error(reason)` and no loop is started. Bind
    /// failures are reported through the state channel, not returned.
    pub async fn listen(&mut self, port: u16) {
        // Toggle semantics: a second listen request stops the active
        // listener instead of stacking another one.
        if self.task.is_some() {
            self.stop_listening().await;
            return;
        }

        let listener = match TcpListener::bind(("0.0.0.0", port)).await {
            Ok(listener) => listener,
            Err(err) => {
                tracing::warn!(port, %err, "bind failed");
                self.state_tx.send_replace(ListenState::Error(err.to_string()));
                return;
            },
        };

        self.local_addr = listener.local_addr().ok();
        self.state_tx.send_replace(ListenState::Listening);
        tracing::info!(addr = ?self.local_addr, "listening");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.shutdown_tx = Some(shutdown_tx);

        let clients = Arc::clone(&self.clients);
        let state_tx = self.state_tx.clone();
        let events_tx = self.events_tx.clone();

        self.task = Some(tokio::spawn(run_listener(
            listener,
            clients,
            state_tx,
            events_tx,
            shutdown_rx,
        )));
    }

    /// Stop the active listener, if any.
    ///
    /// The loop observes the signal at its next await point; the state
    /// transitions to `Closed` unconditionally on loop exit and the port
    /// becomes rebindable. A no-op when nothing is listening.
    pub async fn stop_listening(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }

        self.local_addr = None;
    }

    /// Queue text for a known client and record the optimistic local echo.
    ///
    /// Never blocks on socket I/O: the payload is appended to the client's
    /// outbound queue and recorded in its history before the connection
    /// task flushes it.
    ///
    /// # Errors
    ///
    /// - `ServerError::Encode` if `kind` is [`SendKind::Hex`] and the text
    ///   is not valid hex
    /// - `ServerError::UnknownClient` if no client exists for `addr`
    pub async fn send(
        &self,
        addr: SocketAddr,
        text: &str,
        kind: SendKind,
    ) -> Result<(), ServerError> {
        let client = self
            .clients
            .read()
            .await
            .get(&addr)
            .cloned()
            .ok_or(ServerError::UnknownClient { addr })?;

        let bytes = match kind {
            SendKind::Hex => isoforge_codec::bcd::hex_to_bytes(text)?,
            SendKind::Text => text.as_bytes().to_vec(),
        };

        client.enqueue(bytes, text.to_string()).await;
        Ok(())
    }

    /// Subscribe to listener state transitions.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<ListenState> {
        self.state_tx.subscribe()
    }

    /// Current listener state.
    #[must_use]
    pub fn current_state(&self) -> ListenState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to inbound text events.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<Inbound> {
        self.events_tx.subscribe()
    }

    /// The bound address while listening (useful with port 0).
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// The client for a remote address, if one was ever accepted.
    pub async fn client(&self, addr: SocketAddr) -> Option<Arc<Client>> {
        self.clients.read().await.get(&addr).cloned()
    }

    /// All known clients, connected or not.
    pub async fn clients(&self) -> Vec<Arc<Client>> {
        self.clients.read().await.values().cloned().collect()
    }
}

/// Accept loop: one per active listener.
///
/// Exits when the shutdown signal fires; the closing transition runs
/// unconditionally, even if the loop exits on an accept error.
async fn run_listener(
    listener: TcpListener,
    clients: ClientMap,
    state_tx: watch::Sender<ListenState>,
    events_tx: broadcast::Sender<Inbound>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((socket, addr)) => {
                    accept_connection(socket, addr, &clients, &events_tx, &shutdown_rx).await;
                },
                Err(err) => {
                    // Transient accept failures (e.g. fd exhaustion) do
                    // not take down the listener.
                    tracing::warn!(%err, "accept failed");
                },
            },
        }
    }

    drop(listener);
    state_tx.send_replace(ListenState::Closed);
    tracing::info!("listener closed");
}

/// Map the remote address to its client (create-if-absent) and start the
/// connection task.
async fn accept_connection(
    socket: TcpStream,
    addr: SocketAddr,
    clients: &ClientMap,
    events_tx: &broadcast::Sender<Inbound>,
    shutdown_rx: &watch::Receiver<bool>,
) {
    let client = Arc::clone(
        clients.write().await.entry(addr).or_insert_with(|| Arc::new(Client::new(addr))),
    );

    client.set_connected(true).await;
    // Flush anything queued while the peer was away.
    client.wake_sender();

    tracing::debug!(%addr, "connection accepted");

    tokio::spawn(run_connection(socket, client, events_tx.clone(), shutdown_rx.clone()));
}

/// Read/write loop for one connection.
///
/// Reads drain into the client's history; queued sends are written fully
/// (partial writes are retried by `write_all`, never dropped). An I/O
/// failure closes only this connection and marks the client disconnected.
async fn run_connection(
    socket: TcpStream,
    client: Arc<Client>,
    events_tx: broadcast::Sender<Inbound>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let addr = client.remote_addr();
    let (mut reader, mut writer) = socket.into_split();
    let mut scratch = BytesMut::with_capacity(READ_BUFFER_BYTES);

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,

            () = client.send_ready() => {
                if flush_outbound(&client, &mut writer).await.is_err() {
                    break;
                }
            },

            read = reader.read_buf(&mut scratch) => match read {
                Ok(0) => {
                    tracing::debug!(%addr, "peer closed connection");
                    break;
                },
                Ok(_) => {
                    let content = String::from_utf8_lossy(&scratch).into_owned();
                    scratch.clear();

                    client.push_remote(content.clone()).await;
                    let _ = events_tx.send(Inbound { peer: addr, content });
                },
                Err(err) => {
                    tracing::warn!(%addr, %err, "read failed");
                    break;
                },
            },
        }
    }

    client.set_connected(false).await;
    tracing::debug!(%addr, "connection closed");
}

/// Drain the client's outbound queue onto the socket.
async fn flush_outbound(
    client: &Arc<Client>,
    writer: &mut OwnedWriteHalf,
) -> Result<(), ServerError> {
    while let Some(payload) = client.pop_outbound().await {
        if let Err(err) = writer.write_all(&payload).await {
            tracing::warn!(addr = %client.remote_addr(), %err, "write failed");
            return Err(err.into());
        }
    }
    Ok(())
}
