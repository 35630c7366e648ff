//! `RoyaleClient` builder and handle.
//!
//! The handle is the only public way in: it sends commands to the client
//! actor and reads the latest [`ClientStatus`] it published.

use royale_protocol::{DecodeStats, RoundRules};
use royale_state::{summary, GameState, LinkStatus, MyState};
use royale_timer::{Clock, SystemClock, TimerConfig, TimerDriver};
use royale_transport::{ConnectionState, Connector, WebSocketConnector};
use tokio::sync::{mpsc, oneshot, watch};

use crate::bus::{EventBus, EventKind, Notification, SubscriptionId};
use crate::manager::{ClientStatus, Command, ConnectionManager, ManagerParts};
use crate::reconnect::{FixedInterval, ReconnectPolicy};
use crate::{ClientConfig, RoyaleError};

/// Builder for configuring and starting a [`RoyaleClient`].
///
/// # Example
///
/// ```rust,no_run
/// use royale::prelude::*;
///
/// # async fn run() -> Result<(), RoyaleError> {
/// let client = RoyaleClient::builder()
///     .config(ClientConfig::default().with_endpoint("localhost", 7896))
///     .start()?;
/// client.on_log(|line| println!("{line}"));
/// client.connect().await?;
/// # Ok(())
/// # }
/// ```
pub struct RoyaleClientBuilder<C = WebSocketConnector, K = SystemClock> {
    config: ClientConfig,
    connector: C,
    clock: K,
    policy: Option<Box<dyn ReconnectPolicy>>,
    bus: EventBus,
}

impl RoyaleClientBuilder {
    /// WebSocket transport, Tokio clock, default config.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            connector: WebSocketConnector,
            clock: SystemClock,
            policy: None,
            bus: EventBus::new(),
        }
    }
}

impl Default for RoyaleClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector, K: Clock> RoyaleClientBuilder<C, K> {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the transport.
    pub fn connector<C2: Connector>(self, connector: C2) -> RoyaleClientBuilder<C2, K> {
        RoyaleClientBuilder {
            config: self.config,
            connector,
            clock: self.clock,
            policy: self.policy,
            bus: self.bus,
        }
    }

    /// Replaces the clock the countdown reads.
    pub fn clock<K2: Clock>(self, clock: K2) -> RoyaleClientBuilder<C, K2> {
        RoyaleClientBuilder {
            config: self.config,
            connector: self.connector,
            clock,
            policy: self.policy,
            bus: self.bus,
        }
    }

    /// Replaces the reconnect policy. Defaults to a [`FixedInterval`] of
    /// `config.reconnect_interval`.
    pub fn reconnect_policy(mut self, policy: impl ReconnectPolicy) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Shares an existing bus, e.g. to subscribe before the client starts.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    /// Validates the config and spawns the client task. Must be called
    /// from within a Tokio runtime.
    ///
    /// # Errors
    /// Returns [`RoyaleError::InvalidConfig`] if the config is unusable.
    pub fn start(self) -> Result<RoyaleClient, RoyaleError> {
        let config = self.config.validated()?;

        let (cmd_tx, cmd_rx) = mpsc::channel(config.command_capacity);
        let (status_tx, status_rx) = watch::channel(ClientStatus::default());
        let policy = self
            .policy
            .unwrap_or_else(|| Box::new(FixedInterval(config.reconnect_interval)));
        let timer = TimerDriver::new(
            TimerConfig {
                tick_interval: config.tick_interval,
            },
            self.clock,
        );

        let manager = ConnectionManager::new(ManagerParts {
            connector: self.connector,
            policy,
            timer,
            bus: self.bus.clone(),
            handshake: config.handshake.clone(),
            close_timeout: config.close_timeout,
            commands: cmd_rx,
            status: status_tx,
        });
        tokio::spawn(manager.run());

        tracing::debug!(endpoint = %config.endpoint_url(), "client started");
        Ok(RoyaleClient {
            commands: cmd_tx,
            status: status_rx,
            bus: self.bus,
            config,
        })
    }
}

/// Handle to a running client. Cheap to clone; all clones drive the same
/// client task, which stops once [`stop`](Self::stop) is called or every
/// handle is dropped.
#[derive(Clone)]
pub struct RoyaleClient {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<ClientStatus>,
    bus: EventBus,
    config: ClientConfig,
}

impl RoyaleClient {
    pub fn builder() -> RoyaleClientBuilder {
        RoyaleClientBuilder::new()
    }

    /// Starts a WebSocket client with `config`.
    ///
    /// # Errors
    /// Returns [`RoyaleError::InvalidConfig`] if the config is unusable.
    pub fn start(config: ClientConfig) -> Result<Self, RoyaleError> {
        Self::builder().config(config).start()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -- commands -----------------------------------------------------------

    /// Connects to the configured endpoint. Returns once the attempt has
    /// started; the outcome arrives as a [`Notification::Connection`].
    ///
    /// Calling it again while connected closes the current socket first.
    pub async fn connect(&self) -> Result<(), RoyaleError> {
        self.connect_to(self.config.endpoint_url()).await
    }

    /// Like [`connect`](Self::connect) but to an explicit URL.
    pub async fn connect_to(&self, url: impl Into<String>) -> Result<(), RoyaleError> {
        let url = url.into();
        self.request(|reply| Command::Connect { url, reply }).await
    }

    /// Closes the socket, cancels any pending reconnect and clears the
    /// game state and countdown. Safe to call in any state.
    pub async fn disconnect(&self) -> Result<(), RoyaleError> {
        self.request(|reply| Command::Disconnect { reply }).await
    }

    /// Disconnects and ends the client task. Later commands on any handle
    /// fail with [`RoyaleError::Stopped`].
    pub async fn stop(&self) -> Result<(), RoyaleError> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    async fn request(
        &self,
        command: impl FnOnce(oneshot::Sender<()>) -> Command,
    ) -> Result<(), RoyaleError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| RoyaleError::Stopped)?;
        reply_rx.await.map_err(|_| RoyaleError::Stopped)
    }

    // -- reads --------------------------------------------------------------

    /// The latest published status.
    pub fn status(&self) -> ClientStatus {
        self.status.borrow().clone()
    }

    /// A receiver that is notified on every status change.
    pub fn watch(&self) -> watch::Receiver<ClientStatus> {
        self.status.clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.status.borrow().connection
    }

    /// `true` while a socket is open or being opened.
    pub fn is_connected(&self) -> bool {
        self.connection_state().is_connected()
    }

    pub fn players(&self) -> Vec<String> {
        self.status.borrow().game.players().as_slice().to_vec()
    }

    pub fn losers(&self) -> Vec<String> {
        self.status.borrow().game.losers().to_vec()
    }

    /// Description of the current phase, e.g. `"Mid-game"`.
    pub fn game_state(&self) -> &'static str {
        self.status.borrow().game.phase_text()
    }

    pub fn game_rules(&self) -> RoundRules {
        self.status.borrow().game.rules().clone()
    }

    pub fn snapshot(&self) -> GameState {
        self.status.borrow().game.clone()
    }

    /// Seconds left in the current round.
    pub fn countdown(&self) -> Option<i64> {
        self.status.borrow().countdown
    }

    pub fn decode_stats(&self) -> DecodeStats {
        self.status.borrow().decode
    }

    /// Where `self_name` stands in the game.
    pub fn my_state(&self, self_name: &str) -> MyState {
        let status = self.status.borrow();
        MyState::resolve(&status.game, link_status(&status), self_name)
    }

    /// `"<phase> | <n> player(s) | <my state>"`.
    pub fn summary(&self, self_name: &str) -> String {
        let status = self.status.borrow();
        summary(&status.game, link_status(&status), self_name)
    }

    // -- notifications ------------------------------------------------------

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Registers a sink for human-readable log lines.
    pub fn on_log<F>(&self, sink: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.bus.subscribe(EventKind::Log, move |n| {
            if let Notification::Log(line) = n {
                sink(line);
            }
        })
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }
}

fn link_status(status: &ClientStatus) -> LinkStatus {
    if status.connection == ConnectionState::Open {
        LinkStatus::Up
    } else {
        LinkStatus::Down {
            was_open: status.was_open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_status_from_status() {
        let mut status = ClientStatus::default();
        assert_eq!(link_status(&status), LinkStatus::Down { was_open: false });

        status.connection = ConnectionState::Open;
        status.was_open = true;
        assert_eq!(link_status(&status), LinkStatus::Up);

        status.connection = ConnectionState::Connecting;
        assert_eq!(link_status(&status), LinkStatus::Down { was_open: true });
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_config() {
        let result = RoyaleClient::start(ClientConfig::default().with_endpoint("", 7896));
        assert!(matches!(result, Err(RoyaleError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_fresh_client_reads_defaults() {
        let client = RoyaleClient::start(ClientConfig::default()).unwrap();
        assert!(!client.is_connected());
        assert!(client.players().is_empty());
        assert_eq!(client.game_state(), "Not connected");
        assert_eq!(client.countdown(), None);
        assert_eq!(client.my_state("ana"), MyState::Connecting);
        assert_eq!(client.summary("ana"), "Not connected | 0 players | Connecting...");
        client.stop().await.unwrap();
    }
}
