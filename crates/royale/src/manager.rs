//! The client actor.
//!
//! One task owns the socket, the mirrored game state, the countdown and the
//! reconnect deadline. Everything that can happen to it is a branch of a
//! single `tokio::select!`:
//!
//! ```text
//!   handle commands ──┐
//!   socket open/frame ─┼──→ ConnectionManager ──→ watch::Sender<ClientStatus>
//!   reconnect due ─────┤                      └─→ EventBus
//!   countdown tick ────┘
//! ```
//!
//! Handlers therefore never race each other: a frame can not be applied
//! halfway through a disconnect, and a reconnect can not fire after one.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use royale_protocol::{DecodeStats, FrameDecoder, GameEvent, JsonCodec};
use royale_state::GameState;
use royale_timer::{Clock, Countdown, TimerDriver};
use royale_transport::{Connection, ConnectionState, Connector, TransportError};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::bus::{EventBus, Notification};
use crate::reconnect::ReconnectPolicy;

pub(crate) const CONNECTED_LINE: &str = "Connected via WebSocket";
pub(crate) const LOST_LINE: &str = "WebSocket connection closed. Entering reconnect loop.";

// ---------------------------------------------------------------------------
// Commands and status
// ---------------------------------------------------------------------------

/// Requests sent from a [`RoyaleClient`](crate::RoyaleClient) handle.
///
/// Every variant carries a reply channel that fires once the actor has
/// finished handling it.
pub(crate) enum Command {
    Connect {
        url: String,
        reply: oneshot::Sender<()>,
    },
    Disconnect {
        reply: oneshot::Sender<()>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Read-only view published after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientStatus {
    pub connection: ConnectionState,
    /// An established link existed and was lost without being asked to.
    pub was_open: bool,
    pub game: GameState,
    /// Seconds left in the current round, once the countdown has ticked.
    pub countdown: Option<i64>,
    pub decode: DecodeStats,
}

// ---------------------------------------------------------------------------
// Socket
// ---------------------------------------------------------------------------

type Connecting<T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send>>;

enum Socket<T> {
    None,
    Connecting(Connecting<T>),
    Open(T),
}

enum SocketEvent<T> {
    Opened(Result<T, TransportError>),
    Frame(Result<Option<String>, TransportError>),
}

/// Why the socket went away.
enum Lost {
    /// The attempt to open it failed.
    Refused(TransportError),
    /// The server closed it cleanly.
    Remote,
    Failed(TransportError),
}

/// Resolves when the socket has something to report. Pends with no socket.
///
/// Cancel-safe: the connecting future lives in `socket`, not here, and
/// `recv` on both transports can be dropped without losing a frame.
async fn next_socket_event<T: Connection>(socket: &mut Socket<T>) -> SocketEvent<T> {
    match socket {
        Socket::Connecting(attempt) => SocketEvent::Opened(attempt.as_mut().await),
        Socket::Open(conn) => SocketEvent::Frame(conn.recv().await),
        Socket::None => std::future::pending().await,
    }
}

async fn sleep_until_due(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

pub(crate) struct ManagerParts<C, K: Clock> {
    pub connector: C,
    pub policy: Box<dyn ReconnectPolicy>,
    pub timer: TimerDriver<K>,
    pub bus: EventBus,
    pub handshake: String,
    pub close_timeout: Duration,
    pub commands: mpsc::Receiver<Command>,
    pub status: watch::Sender<ClientStatus>,
}

pub(crate) struct ConnectionManager<C: Connector, K: Clock> {
    connector: Arc<C>,
    /// Where to reconnect to. Cleared by an explicit disconnect.
    url: Option<String>,
    socket: Socket<C::Connection>,
    connection: ConnectionState,
    reconnect_at: Option<Instant>,
    policy: Box<dyn ReconnectPolicy>,
    /// Set on open, cleared once the loss has been announced.
    announce_loss: bool,
    was_open: bool,
    handshake: String,
    close_timeout: Duration,
    decoder: FrameDecoder<JsonCodec>,
    game: GameState,
    countdown: Option<i64>,
    timer: TimerDriver<K>,
    bus: EventBus,
    commands: mpsc::Receiver<Command>,
    status: watch::Sender<ClientStatus>,
}

impl<C: Connector, K: Clock> ConnectionManager<C, K> {
    pub(crate) fn new(parts: ManagerParts<C, K>) -> Self {
        Self {
            connector: Arc::new(parts.connector),
            url: None,
            socket: Socket::None,
            connection: ConnectionState::Idle,
            reconnect_at: None,
            policy: parts.policy,
            announce_loss: false,
            was_open: false,
            handshake: parts.handshake,
            close_timeout: parts.close_timeout,
            decoder: FrameDecoder::new(JsonCodec),
            game: GameState::new(),
            countdown: None,
            timer: parts.timer,
            bus: parts.bus,
            commands: parts.commands,
            status: parts.status,
        }
    }

    /// Runs until a shutdown command arrives or every handle is dropped.
    pub(crate) async fn run(mut self) {
        info!("client actor started");

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Connect { url, reply }) => {
                        self.connect(url).await;
                        let _ = reply.send(());
                    }
                    Some(Command::Disconnect { reply }) => {
                        self.disconnect().await;
                        let _ = reply.send(());
                    }
                    Some(Command::Shutdown { reply }) => {
                        self.disconnect().await;
                        let _ = reply.send(());
                        break;
                    }
                    None => {
                        self.disconnect().await;
                        break;
                    }
                },
                event = next_socket_event(&mut self.socket) => match event {
                    SocketEvent::Opened(Ok(conn)) => self.on_open(conn).await,
                    SocketEvent::Opened(Err(e)) => self.on_lost(Lost::Refused(e)),
                    SocketEvent::Frame(Ok(Some(text))) => self.on_frame(&text),
                    SocketEvent::Frame(Ok(None)) => self.on_lost(Lost::Remote),
                    SocketEvent::Frame(Err(e)) => self.on_lost(Lost::Failed(e)),
                },
                () = sleep_until_due(self.reconnect_at) => self.on_reconnect_due(),
                countdown = self.timer.wait_for_tick() => self.on_tick(countdown),
            }
        }

        info!("client actor stopped");
    }

    // -- commands -----------------------------------------------------------

    /// Opens a socket to `url`, closing any existing one first so that at
    /// most one socket is ever live.
    async fn connect(&mut self, url: String) {
        self.reconnect_at = None;
        self.close_socket().await;
        info!(%url, "connecting");
        self.url = Some(url);
        self.start_attempt();
    }

    /// Deliberate teardown: no reconnect, state and countdown cleared.
    async fn disconnect(&mut self) {
        let was_active = !matches!(self.socket, Socket::None) || self.reconnect_at.is_some();

        self.reconnect_at = None;
        self.url = None;
        self.close_socket().await;

        self.policy.reset();
        self.announce_loss = false;
        self.was_open = false;
        self.timer.reset();
        self.countdown = None;
        self.game.reset();
        self.set_connection(ConnectionState::Idle);
        self.publish_status();

        if was_active {
            self.log("Disconnected".to_string());
        }
    }

    async fn close_socket(&mut self) {
        match std::mem::replace(&mut self.socket, Socket::None) {
            Socket::Open(conn) => {
                self.set_connection(ConnectionState::Closing);
                match time::timeout(self.close_timeout, conn.close()).await {
                    Ok(Ok(())) => debug!(conn_id = %conn.id(), "socket closed"),
                    Ok(Err(e)) => debug!(error = %e, "error while closing socket"),
                    Err(_) => debug!("close timed out; dropping socket"),
                }
            }
            Socket::Connecting(_) => debug!("abandoned connection attempt"),
            Socket::None => {}
        }
    }

    // -- socket -------------------------------------------------------------

    fn start_attempt(&mut self) {
        let Some(url) = self.url.clone() else {
            return;
        };
        let connector = Arc::clone(&self.connector);
        self.socket = Socket::Connecting(Box::pin(async move { connector.connect(&url).await }));
        self.set_connection(ConnectionState::Connecting);
    }

    async fn on_open(&mut self, conn: C::Connection) {
        let conn_id = conn.id();
        if let Err(e) = conn.send_text(&self.handshake).await {
            warn!(%conn_id, error = %e, "handshake failed");
            self.on_lost(Lost::Failed(e));
            return;
        }

        self.socket = Socket::Open(conn);
        self.policy.reset();
        self.announce_loss = true;
        self.was_open = true;
        self.set_connection(ConnectionState::Open);
        info!(%conn_id, "socket open");
        self.log(CONNECTED_LINE.to_string());
    }

    fn on_lost(&mut self, cause: Lost) {
        self.socket = Socket::None;

        match &cause {
            Lost::Refused(e) => debug!(error = %e, "connection attempt failed"),
            Lost::Remote => info!("server closed the connection"),
            Lost::Failed(e) => warn!(error = %e, "connection failed"),
        }

        let delay = self.policy.next_delay();
        self.reconnect_at = Some(Instant::now() + delay);
        debug!(delay_ms = delay.as_millis() as u64, "reconnect scheduled");

        self.set_connection(ConnectionState::Closed);
        if self.announce_loss {
            self.announce_loss = false;
            self.log(LOST_LINE.to_string());
        }
    }

    fn on_reconnect_due(&mut self) {
        self.reconnect_at = None;
        debug!("reconnecting");
        self.start_attempt();
    }

    // -- frames -------------------------------------------------------------

    /// Decode, apply, resync the countdown, then tell subscribers.
    ///
    /// State is updated before handlers run, so a handler that reads the
    /// client sees the state the event produced.
    fn on_frame(&mut self, text: &str) {
        let Some(event) = self.decoder.decode(text) else {
            self.publish_status();
            return;
        };

        match &event {
            GameEvent::DecodeFailure { raw, reason } => {
                self.log(format!("Could not decode message ({reason}): {raw}"));
            }
            _ => self.log(format!("Received message: {text}")),
        }

        let applied = self.game.apply(&event);
        if self.timer.observe(self.game.rules()) {
            self.countdown = self.timer.remaining();
        }
        self.publish_status();

        self.bus.publish(&Notification::Game(event));
        if let Some(winner) = applied.winner {
            self.log(format!("{winner} won the game!"));
            self.bus.publish(&Notification::Winner(winner));
        }
    }

    fn on_tick(&mut self, countdown: Countdown) {
        self.countdown = Some(countdown.remaining);
        self.publish_status();
        self.bus.publish(&Notification::Countdown(countdown));
    }

    // -- outputs ------------------------------------------------------------

    fn set_connection(&mut self, state: ConnectionState) {
        if self.connection == state {
            return;
        }
        self.connection = state;
        self.publish_status();
        self.bus.publish(&Notification::Connection(state));
    }

    fn publish_status(&self) {
        let status = ClientStatus {
            connection: self.connection,
            was_open: self.was_open,
            game: self.game.clone(),
            countdown: self.countdown,
            decode: self.decoder.stats(),
        };
        self.status.send_replace(status);
    }

    /// Human-readable line for the log sink, mirrored to `tracing`.
    fn log(&self, line: String) {
        info!(target: "royale::log", "{line}");
        self.bus.publish(&Notification::Log(line));
    }
}
