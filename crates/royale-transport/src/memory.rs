//! In-process transport: a [`MemoryConnector`] paired with a
//! [`MemoryListener`].
//!
//! Every successful `connect` hands the listener the server end of a fresh
//! channel pair. Either end closes the link by calling `close` (or by being
//! dropped); the other end's `recv` then returns `Ok(None)`, exactly like a
//! clean WebSocket close.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};

use tokio::sync::{mpsc, Mutex};

use crate::{Connection, ConnectionId, Connector, TransportError};

struct Shared {
    accept_tx: mpsc::UnboundedSender<MemoryConnection>,
    refusing: AtomicBool,
    attempts: AtomicU64,
    next_id: AtomicU64,
}

/// Client side of the in-memory transport. Cheap to clone.
#[derive(Clone)]
pub struct MemoryConnector {
    shared: Arc<Shared>,
}

/// Server side of the in-memory transport.
pub struct MemoryListener {
    accept_rx: mpsc::UnboundedReceiver<MemoryConnection>,
    shared: Arc<Shared>,
}

/// Creates a connected connector/listener pair.
pub fn pair() -> (MemoryConnector, MemoryListener) {
    let (accept_tx, accept_rx) = mpsc::unbounded_channel();
    let shared = Arc::new(Shared {
        accept_tx,
        refusing: AtomicBool::new(false),
        attempts: AtomicU64::new(0),
        next_id: AtomicU64::new(1),
    });
    (
        MemoryConnector {
            shared: Arc::clone(&shared),
        },
        MemoryListener { accept_rx, shared },
    )
}

impl MemoryConnector {
    /// Number of `connect` calls made so far, successful or not.
    pub fn attempts(&self) -> u64 {
        self.shared.attempts.load(Ordering::SeqCst)
    }
}

impl MemoryListener {
    /// Waits for the next client connection.
    ///
    /// Returns `None` once every connector has been dropped.
    pub async fn accept(&mut self) -> Option<MemoryConnection> {
        self.accept_rx.recv().await
    }

    /// Returns an already-pending connection without waiting.
    pub fn try_accept(&mut self) -> Option<MemoryConnection> {
        self.accept_rx.try_recv().ok()
    }

    /// While refusing, every `connect` fails with `ConnectFailed`.
    pub fn set_refusing(&self, refusing: bool) {
        self.shared.refusing.store(refusing, Ordering::SeqCst);
    }
}

impl Connector for MemoryConnector {
    type Connection = MemoryConnection;

    async fn connect(&self, url: &str) -> Result<Self::Connection, TransportError> {
        self.shared.attempts.fetch_add(1, Ordering::SeqCst);

        if self.shared.refusing.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectFailed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("{url} refused the connection"),
            )));
        }

        let (to_server, from_client) = mpsc::unbounded_channel();
        let (to_client, from_server) = mpsc::unbounded_channel();
        let id = ConnectionId::new(self.shared.next_id.fetch_add(1, Ordering::SeqCst));

        let server_end = MemoryConnection::new(id, to_client, from_client);
        self.shared.accept_tx.send(server_end).map_err(|_| {
            TransportError::ConnectFailed(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "memory listener dropped",
            ))
        })?;

        tracing::debug!(%id, url, "opened in-memory connection");
        Ok(MemoryConnection::new(id, to_server, from_server))
    }
}

/// One end of an in-memory link.
pub struct MemoryConnection {
    id: ConnectionId,
    tx: std::sync::Mutex<Option<mpsc::UnboundedSender<String>>>,
    rx: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl MemoryConnection {
    fn new(
        id: ConnectionId,
        tx: mpsc::UnboundedSender<String>,
        rx: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        Self {
            id,
            tx: std::sync::Mutex::new(Some(tx)),
            rx: Mutex::new(rx),
        }
    }

    /// `true` once this end has closed or the peer has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_none_or(|tx| tx.is_closed())
    }
}

impl Connection for MemoryConnection {
    async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        let guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = guard
            .as_ref()
            .ok_or_else(|| TransportError::ConnectionClosed("closed locally".into()))?;
        tx.send(text.to_owned())
            .map_err(|_| TransportError::ConnectionClosed("peer went away".into()))
    }

    async fn recv(&self) -> Result<Option<String>, TransportError> {
        Ok(self.rx.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
