//! Per-connection client state.
//!
//! One [`Client`] exists per remote socket address, created on first accept
//! and reused when the same address reconnects, so a peer's message history
//! survives reconnection. The history, outbound queue, and connected flag
//! live behind one async mutex: the connection task and any caller-triggered
//! send mutate them from different tasks, and each critical section (the
//! whole read-record sequence, the whole enqueue sequence) holds the lock
//! end to end.

use std::{collections::VecDeque, net::SocketAddr, time::SystemTime};

use tokio::sync::{Mutex, Notify};

/// Who produced a message in a client's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Sent by this process (queued for the peer).
    Local,
    /// Received from the peer.
    Remote,
}

/// One entry in a client's message history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Who produced the message.
    pub origin: Origin,
    /// Decoded text content.
    pub content: String,
    /// Wall-clock time the entry was recorded.
    pub timestamp: SystemTime,
}

impl Message {
    fn now(origin: Origin, content: String) -> Self {
        Self { origin, content, timestamp: SystemTime::now() }
    }
}

/// State guarded by the client mutex.
#[derive(Debug, Default)]
struct ClientInner {
    /// Message history, newest first.
    messages: Vec<Message>,
    /// FIFO queue of encoded outbound payloads.
    outbound: VecDeque<Vec<u8>>,
    /// Whether a live connection currently backs this client.
    connected: bool,
}

/// Per-remote-address connection state.
///
/// Never evicted: a disconnect only clears the `connected` flag, keeping
/// the history available and letting a reconnect resume where it left off.
#[derive(Debug)]
pub struct Client {
    remote: SocketAddr,
    inner: Mutex<ClientInner>,
    /// Woken whenever the outbound queue gains an entry.
    send_ready: Notify,
}

impl Client {
    pub(crate) fn new(remote: SocketAddr) -> Self {
        Self { remote, inner: Mutex::new(ClientInner::default()), send_ready: Notify::new() }
    }

    /// Remote address this client represents.
    #[must_use]
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Snapshot of the message history, newest first.
    pub async fn history(&self) -> Vec<Message> {
        self.inner.lock().await.messages.clone()
    }

    /// Whether a live connection currently backs this client.
    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.connected
    }

    /// Queue encoded bytes for the peer and record the optimistic local
    /// echo, in one critical section, then wake the connection task.
    pub(crate) async fn enqueue(&self, bytes: Vec<u8>, display: String) {
        {
            let mut inner = self.inner.lock().await;
            inner.messages.insert(0, Message::now(Origin::Local, display));
            inner.outbound.push_back(bytes);
        }
        self.send_ready.notify_one();
    }

    /// Record text received from the peer.
    pub(crate) async fn push_remote(&self, content: String) {
        if content.is_empty() {
            return;
        }
        self.inner.lock().await.messages.insert(0, Message::now(Origin::Remote, content));
    }

    /// Pop the oldest queued outbound payload, if any.
    pub(crate) async fn pop_outbound(&self) -> Option<Vec<u8>> {
        self.inner.lock().await.outbound.pop_front()
    }

    pub(crate) async fn set_connected(&self, connected: bool) {
        self.inner.lock().await.connected = connected;
    }

    /// Wait until [`Client::enqueue`] signals new outbound data.
    pub(crate) async fn send_ready(&self) {
        self.send_ready.notified().await;
    }

    /// Wake the connection task to flush anything already queued (used
    /// right after a reconnect).
    pub(crate) fn wake_sender(&self) {
        self.send_ready.notify_one();
    }
}
